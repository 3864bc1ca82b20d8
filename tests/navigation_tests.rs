use architecture_portal::{
    auth::{Claims, Session},
    models::Role,
    navigation::{
        ModuleHandle, ModuleLoadError, ModuleLoader, ModuleRegistry, NavigationError,
        NavigationOutcome, Navigator, RedirectCause, Route, RouteTable, SignedInGuard, app_routes,
        app_routes::{LAYOUT, LAYOUT_MAIN},
    },
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Notify;

// --- Test Utilities ---

fn signed_in() -> Session {
    Session::signed_in(Claims {
        sub: "admin".to_string(),
        roles: vec![Role::Admin],
        exp: usize::MAX,
        iat: 0,
    })
}

fn shell() -> (Navigator, Arc<ModuleRegistry>) {
    let registry = Arc::new(ModuleRegistry::builtin());
    let navigator = Navigator::new(
        app_routes(Arc::new(SignedInGuard::default())),
        registry.clone(),
    );
    (navigator, registry)
}

fn handle(name: &str) -> ModuleHandle {
    ModuleHandle {
        name: name.to_string(),
        export: format!("{name}-export"),
        title: name.to_string(),
        loaded_at: Utc::now(),
    }
}

/// Loader whose `files` fetch blocks until released; everything else resolves
/// immediately.
#[derive(Default)]
struct GatedLoader {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl ModuleLoader for GatedLoader {
    async fn load(&self, name: &str) -> Result<ModuleHandle, ModuleLoadError> {
        if name == "files" {
            self.started.notify_one();
            self.release.notified().await;
        }
        Ok(handle(name))
    }
}

struct OfflineLoader;

#[async_trait]
impl ModuleLoader for OfflineLoader {
    async fn load(&self, name: &str) -> Result<ModuleHandle, ModuleLoadError> {
        Err(ModuleLoadError::Fetch {
            module: name.to_string(),
            reason: "network unreachable".to_string(),
        })
    }
}

// --- Resolution ---

#[tokio::test]
async fn test_root_activates_signin_regardless_of_session() {
    let (navigator, _) = shell();

    for session in [Session::anonymous(), signed_in()] {
        let resolution = navigator.resolve("", &session).await.unwrap();
        assert_eq!(resolution.url, "");
        assert_eq!(resolution.module_name(), Some("signin"));
        assert_eq!(resolution.layouts, vec![LAYOUT.to_string()]);
        assert!(!resolution.was_redirected());
    }
}

#[tokio::test]
async fn test_guarded_leaf_activates_for_signed_in_session() {
    let (navigator, _) = shell();

    for leaf in ["files", "form", "home", "list"] {
        let resolution = navigator
            .resolve(&format!("/main/{leaf}"), &signed_in())
            .await
            .unwrap();
        assert_eq!(resolution.url, format!("main/{leaf}"));
        assert_eq!(resolution.module_name(), Some(leaf));
        assert_eq!(resolution.layouts, vec![LAYOUT_MAIN.to_string()]);
    }
}

#[tokio::test]
async fn test_guard_denial_never_fetches_module() {
    let (navigator, registry) = shell();

    let resolution = navigator
        .resolve("main/files", &Session::anonymous())
        .await
        .unwrap();

    assert_eq!(resolution.requested, "main/files");
    assert_eq!(resolution.url, "");
    assert_eq!(resolution.module_name(), Some("signin"));
    assert_eq!(resolution.redirects.len(), 1);
    assert_eq!(resolution.redirects[0].cause, RedirectCause::Guard);
    assert_eq!(resolution.redirects[0].from, "main/files");

    // Only the sign-in module was fetched.
    assert_eq!(registry.fetches(), 1);
}

#[tokio::test]
async fn test_unmatched_path_redirects_to_root() {
    let (navigator, _) = shell();

    // Recognition fails before guards run, so the session does not matter.
    for session in [Session::anonymous(), signed_in()] {
        let resolution = navigator.resolve("main/unknown", &session).await.unwrap();
        assert_eq!(resolution.url, "");
        assert_eq!(resolution.module_name(), Some("signin"));
        assert_eq!(resolution.redirects[0].cause, RedirectCause::Route);
    }
}

#[tokio::test]
async fn test_modules_are_cached_after_first_visit() {
    let (navigator, registry) = shell();

    let first = navigator.resolve("main/home", &signed_in()).await.unwrap();
    let second = navigator.resolve("main/home", &signed_in()).await.unwrap();

    assert_eq!(first.module, second.module);
    assert_eq!(registry.fetches(), 1);
}

#[tokio::test]
async fn test_redirect_loop_is_an_error() {
    let table = RouteTable::new([
        Route::new("a").redirect_to("b"),
        Route::new("b").redirect_to("a"),
    ]);
    let navigator = Navigator::new(table, Arc::new(ModuleRegistry::builtin()));

    let err = navigator.resolve("a", &signed_in()).await.unwrap_err();
    assert_eq!(err, NavigationError::RedirectLoop { url: "a".into() });
}

#[tokio::test]
async fn test_no_match_without_wildcard() {
    let table = RouteTable::new([Route::new("home").load_children("home")]);
    let navigator = Navigator::new(table, Arc::new(ModuleRegistry::builtin()));

    let err = navigator.resolve("elsewhere", &signed_in()).await.unwrap_err();
    assert_eq!(err, NavigationError::NoMatch { url: "elsewhere".into() });
}

#[tokio::test]
async fn test_fetch_failure_is_typed() {
    let navigator = Navigator::new(
        app_routes(Arc::new(SignedInGuard::default())),
        Arc::new(OfflineLoader),
    );

    let err = navigator.resolve("main/list", &signed_in()).await.unwrap_err();
    assert!(matches!(
        err,
        NavigationError::ModuleLoad(ModuleLoadError::Fetch { ref module, .. }) if module == "list"
    ));
}

// --- Stateful navigation ---

#[tokio::test]
async fn test_navigate_records_current() {
    let (navigator, _) = shell();
    assert!(navigator.current().is_none());

    let outcome = navigator.navigate("main/form", &signed_in()).await.unwrap();
    let NavigationOutcome::Activated(resolution) = outcome else {
        panic!("expected activation");
    };

    assert_eq!(navigator.current(), Some(resolution));
}

#[tokio::test]
async fn test_newer_navigation_supersedes_pending_fetch() {
    let loader = Arc::new(GatedLoader::default());
    let navigator = Arc::new(Navigator::new(
        app_routes(Arc::new(SignedInGuard::default())),
        loader.clone(),
    ));

    let pending = {
        let navigator = navigator.clone();
        tokio::spawn(async move { navigator.navigate("main/files", &signed_in()).await })
    };

    // Wait until the first navigation is suspended inside the fetch.
    loader.started.notified().await;

    let second = navigator.navigate("main/home", &signed_in()).await.unwrap();
    assert!(matches!(second, NavigationOutcome::Activated(ref r) if r.module_name() == Some("home")));

    let first = pending.await.unwrap().unwrap();
    assert_eq!(
        first,
        NavigationOutcome::Superseded {
            url: "main/files".to_string()
        }
    );

    // The discarded navigation never became current.
    assert_eq!(
        navigator.current().and_then(|r| r.module_name().map(String::from)),
        Some("home".to_string())
    );
}
