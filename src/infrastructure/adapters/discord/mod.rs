//! Discord adapter
//!
//! Wires the extension manager, the console and the error router into a
//! poise framework running on a serenity client.

pub mod checks;
pub mod failure;
pub mod host;
pub mod reply;
pub mod webhook;

use std::sync::Arc;
use poise::serenity_prelude as serenity;
use crate::application::console::Console;
use crate::application::errors::BotError;
use crate::application::services::{admit, register_commands, ConsoleContext, CooldownTracker, Invocation};
use crate::domain::traits::AdminHost;
use crate::extensions::{self, KURD_DX};
use crate::infrastructure::adapters::console;
use crate::infrastructure::config::{BotSettings, SharedConfig};
use crate::infrastructure::logging::LogBuffer;
use crate::plugins::{ExtensionContext, ExtensionManager};

pub use host::SerenityHost;

/// Command context type
pub type Context<'a> = poise::Context<'a, Data, BotError>;

/// Command type every extension contributes
pub type Command = poise::Command<Data, BotError>;

/// State shared by every command, check and event handler
pub struct Data {
    pub config: SharedConfig,
    pub host: Arc<dyn AdminHost>,
    pub extensions: Arc<ExtensionManager>,
    pub console: Arc<Console<ConsoleContext>>,
    pub history: LogBuffer,
    pub cooldowns: CooldownTracker,
}

impl Data {
    /// Admin context with a fresh output sink
    pub fn console_context(&self) -> ConsoleContext {
        ConsoleContext::new(
            self.host.clone(),
            self.extensions.clone(),
            self.config.clone(),
            self.history.clone(),
        )
    }

    pub fn extension_context(&self) -> ExtensionContext {
        ExtensionContext {
            host: self.host.clone(),
            config: self.config.clone(),
        }
    }

    /// Settings re-read from disk
    pub async fn fresh_settings(&self) -> Result<BotSettings, BotError> {
        let mut config = self.config.write().await;
        config.reload()?;
        Ok(BotSettings::from_config(&config)?)
    }

    pub async fn settings(&self) -> Result<BotSettings, BotError> {
        Ok(BotSettings::from_config(&*self.config.read().await)?)
    }
}

/// Startup options for the Discord client
pub struct RunOptions {
    pub token: String,
    pub config: SharedConfig,
    pub history: LogBuffer,
    /// Skip the stdin console
    pub headless: bool,
}

/// Connect to Discord and run until the client shuts down
pub async fn run(options: RunOptions) -> Result<(), BotError> {
    let settings = BotSettings::from_config(&*options.config.read().await)?;
    let extensions = Arc::new(ExtensionManager::new(extensions::catalog()));

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: extensions.all_commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(settings.command_prefix.clone()),
                ..Default::default()
            },
            on_error: |error| Box::pin(failure::on_error(error)),
            command_check: Some(|ctx| Box::pin(command_check(ctx))),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            manual_cooldowns: true,
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!("Logged in as {}", ready.user.name);

                let host: Arc<dyn AdminHost> =
                    Arc::new(SerenityHost::new(ctx.clone(), framework.shard_manager().clone()));
                let data = Data {
                    config: options.config,
                    host,
                    extensions,
                    console: Arc::new(register_commands()),
                    history: options.history,
                    cooldowns: CooldownTracker::new(),
                };

                let admin = data.console_context();
                let discovered = admin.discover_extensions().await?;
                data.extensions.load_all(&discovered, &data.extension_context()).await;

                match data.host.sync_commands(data.extensions.application_commands()).await {
                    Ok(count) => tracing::info!("Synced {} application commands", count),
                    Err(e) => tracing::error!("Failed to sync application commands: {}", e),
                }

                if !options.headless {
                    tokio::spawn(console::run_stdin(data.console.clone(), admin));
                }

                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::all();
    let mut client = serenity::ClientBuilder::new(options.token, intents)
        .framework(framework)
        .await?;

    client.start().await?;
    Ok(())
}

/// Runs before every command
///
/// Settings are re-read from disk while the `kurd_dx` extension is loaded
/// so a maintenance toggle takes effect at once.
async fn command_check(ctx: Context<'_>) -> Result<bool, BotError> {
    let data = ctx.data();
    let command = ctx.command();

    let settings = if data.extensions.is_loaded(KURD_DX) {
        data.fresh_settings().await?
    } else {
        data.settings().await?
    };

    admit(
        &data.extensions,
        &settings,
        &data.cooldowns,
        Invocation {
            name: &command.name,
            qualified_name: &command.qualified_name,
            category: command.category.as_deref(),
            author: ctx.author().id.get(),
        },
    )?;
    Ok(true)
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, BotError>,
    data: &Data,
) -> Result<(), BotError> {
    data.extensions.dispatch_event(ctx, event, data).await
}
