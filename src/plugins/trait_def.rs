//! Extension trait definitions

use std::sync::Arc;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use crate::application::console::command::BoxFuture;
use crate::application::errors::BotError;
use crate::domain::traits::AdminHost;
use crate::infrastructure::adapters::discord::{Command, Data};
use crate::infrastructure::config::SharedConfig;

/// Core trait every loaded extension implements
///
/// An extension instance lives from its `setup` until it is unloaded or
/// replaced by a reload, at which point [`Extension::teardown`] runs.
#[async_trait]
pub trait Extension: Send + Sync {
    /// Qualified name, e.g. `extensions.misc`
    fn name(&self) -> &str;

    /// Called for every gateway event while the extension is loaded
    async fn on_event(
        &self,
        _ctx: &serenity::Context,
        _event: &serenity::FullEvent,
        _data: &Data,
    ) -> Result<(), BotError> {
        Ok(())
    }

    /// Optional: release background tasks when unloaded
    fn teardown(&self) {}
}

/// Handles an extension receives when it is set up
#[derive(Clone)]
pub struct ExtensionContext {
    pub host: Arc<dyn AdminHost>,
    pub config: SharedConfig,
}

/// Module-level setup function of an extension
pub type SetupFn = fn(ExtensionContext) -> BoxFuture<'static, Result<Arc<dyn Extension>, BotError>>;

/// Commands contributed by an extension
pub type CommandsFn = fn() -> Vec<Command>;

/// Compiled-in extension the manager can load by name
#[derive(Clone, Copy)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub setup: SetupFn,
    pub commands: CommandsFn,
}

impl CatalogEntry {
    pub fn new(name: &'static str, setup: SetupFn, commands: CommandsFn) -> Self {
        Self { name, setup, commands }
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry").field("name", &self.name).finish()
    }
}

/// Extension without state or event handling
///
/// Most cogs only contribute commands; their setup returns one of these.
pub struct Plain {
    name: &'static str,
}

impl Plain {
    pub fn new(name: &'static str) -> Arc<dyn Extension> {
        Arc::new(Self { name })
    }
}

#[async_trait]
impl Extension for Plain {
    fn name(&self) -> &str {
        self.name
    }
}
