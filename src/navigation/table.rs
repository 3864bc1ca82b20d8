use std::sync::Arc;

use super::guard::Guard;

/// Path that matches any remaining URL.
pub const WILDCARD: &str = "**";

/// Route
///
/// One node of the route tree. Built declaratively:
///
/// ```ignore
/// Route::new("main")
///     .component("AppLayoutMainComponent")
///     .can_activate(guard)
///     .children([Route::new("home").load_children("home")]);
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    path: String,
    segments: Vec<String>,
    component: Option<String>,
    load_children: Option<String>,
    redirect_to: Option<String>,
    guards: Vec<Arc<dyn Guard>>,
    children: Vec<Route>,
}

impl Route {
    pub fn new(path: &str) -> Self {
        let path = normalize_url(path);
        Self {
            segments: split_segments(&path).map(str::to_string).collect(),
            path,
            component: None,
            load_children: None,
            redirect_to: None,
            guards: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn component(mut self, component: &str) -> Self {
        self.component = Some(component.to_string());
        self
    }

    /// Activates the named feature module, fetched on first visit.
    pub fn load_children(mut self, module: &str) -> Self {
        self.load_children = Some(module.to_string());
        self
    }

    pub fn redirect_to(mut self, target: &str) -> Self {
        self.redirect_to = Some(normalize_url(target));
        self
    }

    pub fn can_activate(mut self, guard: Arc<dyn Guard>) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Route>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn layout(&self) -> Option<&str> {
        self.component.as_deref()
    }

    pub fn module(&self) -> Option<&str> {
        self.load_children.as_deref()
    }

    pub fn guards(&self) -> &[Arc<dyn Guard>] {
        &self.guards
    }

    fn is_wildcard(&self) -> bool {
        self.path == WILDCARD
    }

    /// Number of leading `segments` this route's own path consumes, if it matches.
    fn consume(&self, segments: &[&str]) -> Option<usize> {
        if self.is_wildcard() {
            return Some(segments.len());
        }

        let own = self.segments.len();
        (segments.len() >= own && self.segments.iter().zip(segments).all(|(expected, seg)| expected == seg))
            .then_some(own)
    }
}

/// Recognition
///
/// What the table makes of a URL before guards and loading run.
#[derive(Debug)]
pub enum Recognition<'a> {
    /// Matched routes, outermost first. The last one is the leaf to activate.
    Activate(Vec<&'a Route>),
    /// A redirect route matched; continue at this URL.
    Redirect(String),
}

/// RouteTable
///
/// The root route list. Routes are tried in declaration order and the first
/// complete match wins, backtracking out of subtrees whose children cannot
/// consume the rest of the URL.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: impl IntoIterator<Item = Route>) -> Self {
        Self {
            routes: routes.into_iter().collect(),
        }
    }

    pub fn recognize(&self, url: &str) -> Option<Recognition<'_>> {
        let normalized = normalize_url(url);
        let segments: Vec<&str> = split_segments(&normalized).collect();
        let mut chain = Vec::new();
        match_routes(&self.routes, &segments, &mut chain)
    }
}

fn match_routes<'a>(
    routes: &'a [Route],
    segments: &[&str],
    chain: &mut Vec<&'a Route>,
) -> Option<Recognition<'a>> {
    for route in routes {
        let Some(consumed) = route.consume(segments) else {
            continue;
        };
        let rest = &segments[consumed..];

        if let Some(target) = &route.redirect_to {
            // Redirects need the whole URL, except the wildcard which takes any.
            if rest.is_empty() {
                return Some(Recognition::Redirect(target.clone()));
            }
            continue;
        }

        chain.push(route);
        if route.children.is_empty() {
            if rest.is_empty() {
                return Some(Recognition::Activate(chain.clone()));
            }
        } else if let Some(found) = match_routes(&route.children, rest, chain) {
            return Some(found);
        }
        chain.pop();
    }

    None
}

/// Strips query, fragment and surrounding slashes: `/main/files/?q#x` -> `main/files`.
pub fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    split_segments(path).collect::<Vec<_>>().join("/")
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}
