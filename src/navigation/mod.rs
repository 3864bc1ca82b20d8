//! Server-side resolution of the application shell's routes.
//!
//! A URL is recognized against a declarative `RouteTable`, guarded subtrees are
//! checked against the caller's `Session`, and the leaf's feature module is
//! fetched lazily through a `ModuleLoader`.

pub mod app_routes;
pub mod guard;
pub mod loader;
pub mod navigator;
pub mod table;

pub use app_routes::app_routes;
pub use guard::{Guard, GuardDecision, SignedInGuard};
pub use loader::{FeatureModule, ModuleHandle, ModuleLoadError, ModuleLoader, ModuleRegistry};
pub use navigator::{
    NavigationError, NavigationOutcome, Navigator, Redirect, RedirectCause, Resolution,
};
pub use table::{Recognition, Route, RouteTable};
