use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::watch;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::auth::Session;

use super::{
    guard::GuardDecision,
    loader::{ModuleHandle, ModuleLoadError, ModuleLoader},
    table::{Recognition, Route, RouteTable, normalize_url},
};

/// Upper bound on redirects followed by a single resolution.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("no route matches '{url}'")]
    NoMatch { url: String },

    #[error("too many redirects while resolving '{url}'")]
    RedirectLoop { url: String },

    #[error(transparent)]
    ModuleLoad(#[from] ModuleLoadError),
}

/// RedirectCause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum RedirectCause {
    /// A `redirect_to` route matched (including the wildcard).
    Route,
    /// A guard refused the matched subtree.
    Guard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Redirect {
    pub from: String,
    pub to: String,
    pub cause: RedirectCause,
}

/// Resolution
///
/// A completed resolution: where the navigation ended, which layouts wrap the
/// leaf (outermost first) and the feature module it activated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Resolution {
    pub requested: String,
    pub url: String,
    pub layouts: Vec<String>,
    pub module: Option<ModuleHandle>,
    pub redirects: Vec<Redirect>,
}

impl Resolution {
    pub fn module_name(&self) -> Option<&str> {
        self.module.as_ref().map(|module| module.name.as_str())
    }

    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// NavigationOutcome
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    Activated(Resolution),
    /// A newer navigation started before this one finished; its result was dropped.
    Superseded { url: String },
}

/// Navigator
///
/// Resolves URLs against a `RouteTable`: recognition, then guards, then the lazy
/// module fetch.
pub struct Navigator {
    table: RouteTable,
    loader: Arc<dyn ModuleLoader>,
    // Bumped by every `navigate` call; in-flight navigations watch it.
    generation: watch::Sender<u64>,
    current: RwLock<Option<Resolution>>,
}

impl Navigator {
    pub fn new(table: RouteTable, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            table,
            loader,
            generation: watch::Sender::new(0),
            current: RwLock::new(None),
        }
    }

    /// The last navigation that completed without being superseded.
    pub fn current(&self) -> Option<Resolution> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// resolve
    ///
    /// Stateless resolution of `url` for `session`:
    ///
    /// 1. Recognize. A redirect route restarts resolution at its target.
    /// 2. Run the guards of the matched chain, outermost first. The first
    ///    `Redirect` decision restarts resolution at its target.
    /// 3. Fetch the leaf's feature module.
    pub async fn resolve(&self, url: &str, session: &Session) -> Result<Resolution, NavigationError> {
        let requested = normalize_url(url);
        let mut target = requested.clone();
        let mut redirects = Vec::new();

        loop {
            if redirects.len() > MAX_REDIRECTS {
                tracing::warn!(url = %requested, "redirect loop");
                return Err(NavigationError::RedirectLoop { url: requested });
            }

            let chain = match self.table.recognize(&target) {
                Some(Recognition::Activate(chain)) => chain,
                Some(Recognition::Redirect(to)) => {
                    redirects.push(Redirect {
                        from: std::mem::replace(&mut target, to.clone()),
                        to,
                        cause: RedirectCause::Route,
                    });
                    continue;
                }
                None => return Err(NavigationError::NoMatch { url: target }),
            };

            if let Some(to) = run_guards(&chain, session).await {
                let to = normalize_url(&to);
                tracing::debug!(from = %target, to = %to, "guard redirect");
                redirects.push(Redirect {
                    from: std::mem::replace(&mut target, to.clone()),
                    to,
                    cause: RedirectCause::Guard,
                });
                continue;
            }

            let module = match chain.last().and_then(|leaf| leaf.module()) {
                Some(name) => Some(self.loader.load(name).await?),
                None => None,
            };

            let layouts = chain
                .iter()
                .filter_map(|route| route.layout())
                .map(String::from)
                .collect();

            return Ok(Resolution {
                requested,
                url: target,
                layouts,
                module,
                redirects,
            });
        }
    }

    /// navigate
    ///
    /// Starts a new navigation. Any navigation still in flight is superseded: it
    /// returns `Superseded` as soon as it notices, and its result is never
    /// recorded as `current`.
    pub async fn navigate(
        &self,
        url: &str,
        session: &Session,
    ) -> Result<NavigationOutcome, NavigationError> {
        let mut id = 0;
        self.generation.send_modify(|generation| {
            *generation += 1;
            id = *generation;
        });
        let mut changes = self.generation.subscribe();

        let superseded = async {
            loop {
                if *changes.borrow_and_update() != id {
                    return;
                }
                if changes.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            biased;
            _ = superseded => {
                tracing::debug!(url, navigation = id, "navigation superseded");
                Ok(NavigationOutcome::Superseded { url: normalize_url(url) })
            }
            resolved = self.resolve(url, session) => {
                let resolution = resolved?;
                let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
                if *self.generation.borrow() != id {
                    return Ok(NavigationOutcome::Superseded { url: resolution.requested });
                }
                tracing::info!(url = %resolution.url, module = ?resolution.module_name(), "navigation activated");
                *current = Some(resolution.clone());
                Ok(NavigationOutcome::Activated(resolution))
            }
        }
    }
}

async fn run_guards(chain: &[&Route], session: &Session) -> Option<String> {
    for route in chain {
        for guard in route.guards() {
            if let GuardDecision::Redirect(to) = guard.can_activate(session).await {
                return Some(to);
            }
        }
    }
    None
}
