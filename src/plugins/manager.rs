//! Extension manager - handles extension lifecycle
//!
//! The manager owns the catalog of compiled-in extensions and the set that
//! is currently loaded. Discovery is done by the caller, so the same
//! reconciliation runs against a directory scan in production and against
//! a plain list in tests.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::{error, info, warn};
use poise::serenity_prelude as serenity;
use crate::application::errors::{BotError, ExtensionError};
use crate::infrastructure::adapters::discord::{Command, Data};
use super::trait_def::{CatalogEntry, Extension, ExtensionContext};

/// Manages all extensions for the bot
pub struct ExtensionManager {
    catalog: BTreeMap<&'static str, CatalogEntry>,
    loaded: RwLock<BTreeMap<String, Arc<dyn Extension>>>,
}

impl ExtensionManager {
    pub fn new(catalog: impl IntoIterator<Item = CatalogEntry>) -> Self {
        Self {
            catalog: catalog.into_iter().map(|entry| (entry.name, entry)).collect(),
            loaded: RwLock::new(BTreeMap::new()),
        }
    }

    /// Names of every extension compiled into the binary
    pub fn available(&self) -> Vec<&'static str> {
        self.catalog.keys().copied().collect()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded
            .read()
            .map(|loaded| loaded.contains_key(name))
            .unwrap_or(false)
    }

    /// Names of the loaded extensions, sorted
    pub fn loaded_names(&self) -> Vec<String> {
        self.loaded
            .read()
            .map(|loaded| loaded.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of the loaded extension instances
    pub fn loaded(&self) -> Vec<Arc<dyn Extension>> {
        self.loaded
            .read()
            .map(|loaded| loaded.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.loaded.read().map(|loaded| loaded.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn instantiate(&self, name: &str, ctx: &ExtensionContext) -> Result<Arc<dyn Extension>, ExtensionError> {
        let entry = self
            .catalog
            .get(name)
            .ok_or_else(|| ExtensionError::NotFound(name.to_string()))?;
        (entry.setup)(ctx.clone())
            .await
            .map_err(|e| ExtensionError::Setup {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    fn insert(&self, name: &str, extension: Arc<dyn Extension>) -> Result<Option<Arc<dyn Extension>>, ExtensionError> {
        let mut loaded = self.loaded.write()
            .map_err(|_| ExtensionError::Internal("Lock poisoned".to_string()))?;
        Ok(loaded.insert(name.to_string(), extension))
    }

    /// Load a single extension
    pub async fn load(&self, name: &str, ctx: &ExtensionContext) -> Result<(), ExtensionError> {
        if self.is_loaded(name) {
            return Err(ExtensionError::Setup {
                name: name.to_string(),
                reason: "already loaded".to_string(),
            });
        }
        let extension = self.instantiate(name, ctx).await?;
        if let Some(previous) = self.insert(name, extension)? {
            previous.teardown();
        }
        Ok(())
    }

    /// Replace a loaded extension with a fresh instance
    ///
    /// The old instance stays loaded when the new one fails to set up.
    pub async fn reload_one(&self, name: &str, ctx: &ExtensionContext) -> Result<(), ExtensionError> {
        if !self.is_loaded(name) {
            return Err(ExtensionError::NotFound(name.to_string()));
        }
        let extension = self.instantiate(name, ctx).await?;
        if let Some(previous) = self.insert(name, extension)? {
            previous.teardown();
        }
        Ok(())
    }

    /// Unload a single extension
    pub fn unload(&self, name: &str) -> Result<(), ExtensionError> {
        let removed = {
            let mut loaded = self.loaded.write()
                .map_err(|_| ExtensionError::Internal("Lock poisoned".to_string()))?;
            loaded.remove(name)
        };
        match removed {
            Some(extension) => {
                extension.teardown();
                info!("Unloaded extension {}", name);
                Ok(())
            }
            None => Err(ExtensionError::NotFound(name.to_string())),
        }
    }

    /// Load every discovered extension that is not loaded yet
    ///
    /// A failing extension is logged and skipped.
    pub async fn load_all(&self, discovered: &[String], ctx: &ExtensionContext) {
        for name in discovered {
            if self.is_loaded(name) {
                continue;
            }
            match self.load(name, ctx).await {
                Ok(()) => info!("Loaded extension {}", name),
                Err(e) => error!("Failed to load extension {}: {}", name, e),
            }
        }

        if self.is_empty() {
            warn!("No extensions loaded");
        }
    }

    /// Reconcile the loaded set against the discovered one
    ///
    /// Each discovered extension is reloaded or loaded in turn, and after
    /// each step any loaded extension missing from `discovered` is unloaded.
    /// Returns the names that were (re)loaded successfully.
    pub async fn reload(&self, discovered: &[String], ctx: &ExtensionContext) -> Vec<String> {
        let mut reloaded = Vec::new();

        for name in discovered {
            let result = if self.is_loaded(name) {
                self.reload_one(name, ctx).await
            } else {
                self.load(name, ctx).await
            };

            self.unload_missing(discovered);

            match result {
                Ok(()) => {
                    info!("Reloaded extension {}", name);
                    reloaded.push(name.clone());
                }
                Err(e) => error!("Failed to reload extension {}: {}", name, e),
            }
        }

        // Nothing discovered means the loop never ran
        self.unload_missing(discovered);
        reloaded
    }

    fn unload_missing(&self, discovered: &[String]) {
        for name in self.loaded_names() {
            if !discovered.contains(&name) {
                if let Err(e) = self.unload(&name) {
                    error!("Failed to unload extension {}: {}", name, e);
                }
            }
        }
    }

    /// Every command of every compiled-in extension, tagged with its extension
    ///
    /// Commands of unloaded extensions are still registered with the
    /// framework; the pre-command check turns them away.
    pub fn all_commands(&self) -> Vec<Command> {
        self.catalog
            .values()
            .flat_map(|entry| tag(entry))
            .collect()
    }

    /// Commands of the loaded extensions only
    pub fn active_commands(&self) -> Vec<Command> {
        let loaded = self.loaded_names();
        self.catalog
            .values()
            .filter(|entry| loaded.iter().any(|name| name == entry.name))
            .flat_map(|entry| tag(entry))
            .collect()
    }

    /// Application command payloads for the loaded extensions
    pub fn application_commands(&self) -> Vec<serenity::CreateCommand> {
        poise::builtins::create_application_commands(&self.active_commands())
    }

    /// Forward a gateway event to every loaded extension
    pub async fn dispatch_event(&self, ctx: &serenity::Context, event: &serenity::FullEvent, data: &Data) -> Result<(), BotError> {
        for extension in self.loaded() {
            if let Err(e) = extension.on_event(ctx, event, data).await {
                error!("Extension {} failed to handle {}: {}", extension.name(), event.snake_case_name(), e);
            }
        }
        Ok(())
    }
}

fn tag(entry: &CatalogEntry) -> Vec<Command> {
    (entry.commands)()
        .into_iter()
        .map(|command| poise::Command {
            category: Some(entry.name.to_string()),
            ..command
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use async_trait::async_trait;
    use crate::application::console::command::BoxFuture;
    use crate::domain::test_support::FakeHost;
    use crate::infrastructure::config::Config;

    static TEARDOWNS: AtomicUsize = AtomicUsize::new(0);

    struct Counted(&'static str);

    #[async_trait]
    impl Extension for Counted {
        fn name(&self) -> &str {
            self.0
        }

        fn teardown(&self) {
            TEARDOWNS.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn ok_a(_: ExtensionContext) -> BoxFuture<'static, Result<Arc<dyn Extension>, BotError>> {
        Box::pin(async { Ok(Arc::new(Counted("extensions.a")) as Arc<dyn Extension>) })
    }

    fn ok_b(_: ExtensionContext) -> BoxFuture<'static, Result<Arc<dyn Extension>, BotError>> {
        Box::pin(async { Ok(Arc::new(Counted("extensions.b")) as Arc<dyn Extension>) })
    }

    fn ok_c(_: ExtensionContext) -> BoxFuture<'static, Result<Arc<dyn Extension>, BotError>> {
        Box::pin(async { Ok(Arc::new(Counted("extensions.c")) as Arc<dyn Extension>) })
    }

    fn broken(_: ExtensionContext) -> BoxFuture<'static, Result<Arc<dyn Extension>, BotError>> {
        Box::pin(async { Err(BotError::Value("setup failed".into())) })
    }

    fn no_commands() -> Vec<Command> {
        Vec::new()
    }

    fn manager() -> ExtensionManager {
        ExtensionManager::new([
            CatalogEntry::new("extensions.a", ok_a, no_commands),
            CatalogEntry::new("extensions.b", ok_b, no_commands),
            CatalogEntry::new("extensions.c", ok_c, no_commands),
            CatalogEntry::new("extensions.broken", broken, no_commands),
        ])
    }

    fn context(dir: &tempfile::TempDir) -> ExtensionContext {
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();
        ExtensionContext {
            host: Arc::new(FakeHost::default()),
            config: Config::load(path).unwrap().into_shared(),
        }
    }

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn load_all_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let manager = manager();

        manager
            .load_all(&names(&["extensions.a", "extensions.broken", "extensions.missing", "extensions.b"]), &ctx)
            .await;

        assert_eq!(manager.loaded_names(), names(&["extensions.a", "extensions.b"]));
    }

    #[tokio::test]
    async fn reload_converges_to_discovered_set() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let manager = manager();

        manager.load_all(&names(&["extensions.a", "extensions.b"]), &ctx).await;

        let discovered = names(&["extensions.b", "extensions.broken", "extensions.c"]);
        let reloaded = manager.reload(&discovered, &ctx).await;

        assert_eq!(reloaded, names(&["extensions.b", "extensions.c"]));
        assert_eq!(manager.loaded_names(), names(&["extensions.b", "extensions.c"]));
        assert!(!manager.is_loaded("extensions.a"));
    }

    #[tokio::test]
    async fn reload_with_nothing_discovered_unloads_everything() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let manager = manager();

        manager.load_all(&names(&["extensions.a"]), &ctx).await;
        manager.reload(&[], &ctx).await;

        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn replaced_and_unloaded_instances_are_torn_down() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let manager = manager();
        let before = TEARDOWNS.load(Ordering::SeqCst);

        manager.load("extensions.c", &ctx).await.unwrap();
        manager.reload_one("extensions.c", &ctx).await.unwrap();
        manager.unload("extensions.c").unwrap();

        assert!(TEARDOWNS.load(Ordering::SeqCst) >= before + 2);
        assert!(matches!(manager.unload("extensions.c"), Err(ExtensionError::NotFound(_))));
    }

    #[tokio::test]
    async fn loading_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let manager = manager();

        manager.load("extensions.a", &ctx).await.unwrap();
        assert!(matches!(
            manager.load("extensions.a", &ctx).await,
            Err(ExtensionError::Setup { .. })
        ));
    }
}
