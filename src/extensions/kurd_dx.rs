//! Developer tooling
//!
//! Relays the admin console into chat through the `cs` family of commands
//! and keeps the presence in step with the guild count and maintenance flag.
//! Loading this extension also turns on the maintenance gate.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use tokio::task::JoinHandle;
use crate::application::errors::BotError;
use crate::domain::traits::{AdminHost, Presence};
use crate::infrastructure::adapters::discord::reply::{relay, relay_reply};
use crate::infrastructure::adapters::discord::{checks, Command, Context};
use crate::infrastructure::config::{BotSettings, SharedConfig};
use crate::plugins::{Extension, ExtensionContext};

const PRESENCE_INTERVAL: Duration = Duration::from_secs(10 * 60);

pub struct KurdDx {
    presence: JoinHandle<()>,
}

#[async_trait]
impl Extension for KurdDx {
    fn name(&self) -> &str {
        super::KURD_DX
    }

    fn teardown(&self) {
        self.presence.abort();
    }
}

pub async fn setup(ctx: ExtensionContext) -> Result<Arc<dyn Extension>, BotError> {
    let presence = tokio::spawn(presence_loop(ctx.host, ctx.config));
    Ok(Arc::new(KurdDx { presence }))
}

pub fn commands() -> Vec<Command> {
    vec![cs(), csx(), csf(), csfx()]
}

async fn presence_loop(host: Arc<dyn AdminHost>, config: SharedConfig) {
    let mut interval = tokio::time::interval(PRESENCE_INTERVAL);
    loop {
        interval.tick().await;
        if let Err(e) = update_presence(host.as_ref(), &config).await {
            tracing::error!("Failed to update presence: {}", e);
        }
    }
}

/// Set the presence from the persisted maintenance flag
pub async fn update_presence(host: &dyn AdminHost, config: &SharedConfig) -> Result<(), BotError> {
    let maintenance = {
        let mut config = config.write().await;
        config.reload()?;
        BotSettings::from_config(&config)?.maintenance
    };
    host.set_presence(Presence::for_guilds(host.guild_count(), maintenance));
    Ok(())
}

/// Run a console command
#[poise::command(prefix_command, check = "checks::dev_only")]
pub async fn cs(ctx: Context<'_>, #[rest] command: String) -> Result<(), BotError> {
    run_console(ctx, &command, false, false).await
}

/// Run a console command, timestamps included
#[poise::command(prefix_command, check = "checks::dev_only")]
pub async fn csx(ctx: Context<'_>, #[rest] command: String) -> Result<(), BotError> {
    run_console(ctx, &command, true, false).await
}

/// Run a console command and attach the output as a file
#[poise::command(prefix_command, check = "checks::dev_only")]
pub async fn csf(ctx: Context<'_>, #[rest] command: String) -> Result<(), BotError> {
    run_console(ctx, &command, false, true).await
}

/// Run a console command and attach the timestamped output as a file
#[poise::command(prefix_command, check = "checks::dev_only")]
pub async fn csfx(ctx: Context<'_>, #[rest] command: String) -> Result<(), BotError> {
    run_console(ctx, &command, true, true).await
}

async fn run_console(ctx: Context<'_>, line: &str, timestamps: bool, force_file: bool) -> Result<(), BotError> {
    ctx.defer_or_broadcast().await?;

    let data = ctx.data();
    let admin = data.console_context();
    let out = admin.out.clone();
    data.console.dispatch(admin, line).await?;

    ctx.send(relay_reply(relay(&out.render(timestamps), force_file))).await?;
    Ok(())
}
