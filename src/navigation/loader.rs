use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};
use thiserror::Error;
use tokio::sync::OnceCell;
use ts_rs::TS;
use utoipa::ToSchema;

/// FeatureModule
///
/// Manifest of a lazily loaded feature: the route-facing name, the symbol it
/// exports and a human readable title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureModule {
    pub name: String,
    pub export: String,
    pub title: String,
}

impl FeatureModule {
    pub fn new(name: &str, export: &str, title: &str) -> Self {
        Self {
            name: name.to_string(),
            export: export.to_string(),
            title: title.to_string(),
        }
    }
}

/// ModuleHandle
///
/// A fetched feature module, ready to be activated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ModuleHandle {
    pub name: String,
    pub export: String,
    pub title: String,
    #[ts(type = "string")]
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleLoadError {
    #[error("no feature module named '{0}'")]
    UnknownModule(String),

    #[error("failed to fetch feature module '{module}': {reason}")]
    Fetch { module: String, reason: String },
}

/// ModuleLoader
///
/// The asynchronous fetch step of lazy loading. This is the only place a
/// navigation suspends.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, name: &str) -> Result<ModuleHandle, ModuleLoadError>;
}

/// A manifest and its fetched handle, filled at most once.
struct Slot {
    manifest: FeatureModule,
    handle: OnceCell<ModuleHandle>,
}

/// ModuleRegistry
///
/// Loader backed by a fixed set of manifests. Each module is fetched on first
/// use and served from the cache afterwards. Concurrent first visits to the
/// same module share one fetch, and a pending fetch only blocks its own module.
pub struct ModuleRegistry {
    slots: HashMap<String, Slot>,
    fetches: AtomicUsize,
}

impl ModuleRegistry {
    pub fn new(modules: impl IntoIterator<Item = FeatureModule>) -> Self {
        Self {
            slots: modules
                .into_iter()
                .map(|manifest| {
                    let slot = Slot {
                        manifest,
                        handle: OnceCell::new(),
                    };
                    (slot.manifest.name.clone(), slot)
                })
                .collect(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// The feature modules of the application shell.
    pub fn builtin() -> Self {
        Self::new([
            FeatureModule::new("signin", "AppSigninModule", "Sign in"),
            FeatureModule::new("files", "AppFilesModule", "Files"),
            FeatureModule::new("form", "AppFormModule", "Form"),
            FeatureModule::new("home", "AppHomeModule", "Home"),
            FeatureModule::new("list", "AppListModule", "List"),
        ])
    }

    /// How many modules have actually been fetched (cache misses).
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    async fn fetch(&self, manifest: &FeatureModule) -> ModuleHandle {
        // Manifests are in-process, the yield stands in for the network fetch.
        tokio::task::yield_now().await;
        self.fetches.fetch_add(1, Ordering::Relaxed);

        ModuleHandle {
            name: manifest.name.clone(),
            export: manifest.export.clone(),
            title: manifest.title.clone(),
            loaded_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ModuleLoader for ModuleRegistry {
    async fn load(&self, name: &str) -> Result<ModuleHandle, ModuleLoadError> {
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| ModuleLoadError::UnknownModule(name.to_string()))?;

        if let Some(handle) = slot.handle.get() {
            tracing::trace!(module = name, "feature module served from cache");
            return Ok(handle.clone());
        }

        let handle = slot
            .handle
            .get_or_init(|| async {
                let handle = self.fetch(&slot.manifest).await;
                tracing::info!(module = name, export = %handle.export, "feature module loaded");
                handle
            })
            .await;
        Ok(handle.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{future, sync::Arc, time::Duration};

    #[tokio::test]
    async fn loads_builtin_module_once() {
        let registry = ModuleRegistry::builtin();

        let first = registry.load("files").await.unwrap();
        let second = registry.load("files").await.unwrap();

        assert_eq!(first.export, "AppFilesModule");
        assert_eq!(first, second);
        assert_eq!(registry.fetches(), 1);
    }

    #[tokio::test]
    async fn unknown_module_is_an_error() {
        let registry = ModuleRegistry::builtin();
        let err = registry.load("reports").await.unwrap_err();
        assert_eq!(err, ModuleLoadError::UnknownModule("reports".into()));
        assert_eq!(registry.fetches(), 0);
    }

    #[tokio::test]
    async fn concurrent_first_visits_share_one_fetch() {
        let registry = ModuleRegistry::builtin();

        let (a, b, c) = tokio::join!(
            registry.load("list"),
            registry.load("list"),
            registry.load("form"),
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(c.unwrap().name, "form");
        assert_eq!(registry.fetches(), 2);
    }

    #[tokio::test]
    async fn pending_fetch_does_not_block_other_modules() {
        let registry = Arc::new(ModuleRegistry::builtin());

        // Hold the `files` slot with a fetch that never finishes.
        let stalled = {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry.slots["files"]
                    .handle
                    .get_or_init(future::pending::<ModuleHandle>)
                    .await;
            })
        };
        tokio::task::yield_now().await;

        let home = tokio::time::timeout(Duration::from_secs(1), registry.load("home"))
            .await
            .expect("home blocked behind files")
            .unwrap();
        assert_eq!(home.export, "AppHomeModule");

        // Abandoning the stalled fetch frees the slot for the next visitor.
        stalled.abort();
        let _ = stalled.await;
        let files = registry.load("files").await.unwrap();
        assert_eq!(files.export, "AppFilesModule");
        assert_eq!(registry.fetches(), 2);
    }
}
