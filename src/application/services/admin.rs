//! Admin command set for the developer console

use std::sync::Arc;
use std::time::Duration;
use crate::application::console::{ArgValue, Console, ConsoleCommand, HandlerResult, ParamKind, ParsedArgs, Status};
use crate::application::errors::{BotError, HostError};
use crate::domain::entities::InviteSummary;
use crate::domain::traits::AdminHost;
use crate::infrastructure::config::{BotSettings, SharedConfig};
use crate::infrastructure::logging::{ConsoleLog, LogBuffer};
use crate::infrastructure::plugins::ExtensionScanner;
use crate::plugins::{ExtensionContext, ExtensionManager};

const INVITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything an admin command can touch
///
/// Cloned per dispatch; `out` collects that dispatch's output.
#[derive(Clone)]
pub struct ConsoleContext {
    pub host: Arc<dyn AdminHost>,
    pub extensions: Arc<ExtensionManager>,
    pub config: SharedConfig,
    pub history: LogBuffer,
    pub out: ConsoleLog,
}

impl ConsoleContext {
    pub fn new(
        host: Arc<dyn AdminHost>,
        extensions: Arc<ExtensionManager>,
        config: SharedConfig,
        history: LogBuffer,
    ) -> Self {
        Self {
            host,
            extensions,
            config,
            history,
            out: ConsoleLog::new(),
        }
    }

    /// Same handles with a fresh output sink
    pub fn fresh(&self) -> Self {
        Self {
            out: ConsoleLog::new(),
            ..self.clone()
        }
    }

    pub fn extension_context(&self) -> ExtensionContext {
        ExtensionContext {
            host: self.host.clone(),
            config: self.config.clone(),
        }
    }

    /// Scan the configured extension directory
    pub async fn discover_extensions(&self) -> Result<Vec<String>, BotError> {
        let settings = BotSettings::from_config(&*self.config.read().await)?;
        Ok(ExtensionScanner::new(settings.extensions_dir)?.discover()?)
    }
}

/// Build the console with every admin command registered
pub fn register_commands() -> Console<ConsoleContext> {
    let mut console = Console::new();

    console.register(
        ConsoleCommand::new("say")
            .with_description("Send a message to a channel")
            .with_param("channel_id", ParamKind::Int)
            .with_param("message_content", ParamKind::Str)
            .with_handler(|ctx: ConsoleContext, args: ParsedArgs| async move {
                let channel_id = snowflake(&args, "channel_id")?;
                say(ctx, channel_id, args.string("message_content")?).await
            }),
    );

    console.register(
        ConsoleCommand::new("export log")
            .with_description("Print everything logged so far")
            .with_handler(|ctx: ConsoleContext, _| async move { export_log(ctx) }),
    );

    console.register(
        ConsoleCommand::new("servers")
            .with_description("Count the servers the bot is in")
            .with_handler(|ctx: ConsoleContext, _| async move { servers(ctx) }),
    );

    console.register(
        ConsoleCommand::new("server list")
            .with_description("List the servers the bot is in")
            .with_optional("fetch_invite", ArgValue::Bool(false))
            .with_handler(|ctx: ConsoleContext, args: ParsedArgs| async move {
                server_list(ctx, args.bool("fetch_invite")?).await
            }),
    );

    console.register(
        ConsoleCommand::new("server info")
            .with_description("Show details of a server")
            .with_param("guild_id", ParamKind::Int)
            .with_optional("show_members", ArgValue::Bool(false))
            .with_handler(|ctx: ConsoleContext, args: ParsedArgs| async move {
                let guild_id = snowflake(&args, "guild_id")?;
                server_info(ctx, guild_id, args.bool("show_members")?).await
            }),
    );

    console.register(
        ConsoleCommand::new("create invite")
            .with_description("Create an invite to a server")
            .with_param("guild_id", ParamKind::Int)
            .with_handler(|ctx: ConsoleContext, args: ParsedArgs| async move {
                create_invite(ctx, snowflake(&args, "guild_id")?).await
            }),
    );

    console.register(
        ConsoleCommand::new("reload")
            .with_description("Reload every extension")
            .with_optional("sync_tree", ArgValue::Bool(false))
            .with_handler(|ctx: ConsoleContext, args: ParsedArgs| async move {
                reload(ctx, args.bool("sync_tree")?).await
            }),
    );

    console.register(
        ConsoleCommand::new("sync")
            .with_description("Register slash commands with Discord")
            .with_handler(|ctx: ConsoleContext, _| async move { sync(ctx).await }),
    );

    console.register(
        ConsoleCommand::new("clear")
            .with_description("Clear the terminal and the log history")
            .with_handler(|ctx: ConsoleContext, _| async move { clear(ctx) }),
    );

    console.register(
        ConsoleCommand::new("leave")
            .with_description("Leave a server")
            .with_param("guild_id", ParamKind::Int)
            .with_handler(|ctx: ConsoleContext, args: ParsedArgs| async move {
                leave(ctx, snowflake(&args, "guild_id")?).await
            }),
    );

    console.register(
        ConsoleCommand::new("maintenance")
            .with_description("Turn maintenance mode on or off")
            .with_param("status", ParamKind::Bool)
            .with_handler(|ctx: ConsoleContext, args: ParsedArgs| async move {
                maintenance(ctx, args.bool("status")?).await
            }),
    );

    console.register(
        ConsoleCommand::new("stop")
            .with_description("Disconnect and exit")
            .with_handler(|ctx: ConsoleContext, _| async move { stop(ctx).await }),
    );

    console
}

/// Discord ids are unsigned
fn snowflake(args: &ParsedArgs, name: &str) -> Result<u64, BotError> {
    let id = args.int(name)?;
    u64::try_from(id).map_err(|_| BotError::Value(format!("Argument '{}' must be a valid ID.", name)))
}

pub async fn say(ctx: ConsoleContext, channel_id: u64, content: &str) -> HandlerResult {
    match ctx.host.send_message(channel_id, content).await {
        Ok(()) => {
            ctx.out.info(format!("Sent message to channel {}: {}", channel_id, content));
            Ok(Status::Success)
        }
        Err(e @ (HostError::ChannelNotFound(_) | HostError::NotTextChannel(_))) => {
            ctx.out.error(e.to_string());
            Ok(Status::Failure)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn export_log(ctx: ConsoleContext) -> HandlerResult {
    let lines = ctx.history.lines();
    if lines.is_empty() {
        ctx.out.error("No output");
        return Ok(Status::Failure);
    }

    let contents: Vec<String> = lines.iter().map(|line| format!("- {}", line)).collect();
    ctx.out.info(contents.join("\n"));
    Ok(Status::Success)
}

pub fn servers(ctx: ConsoleContext) -> HandlerResult {
    ctx.out.info(format!("Bot is in {} servers", ctx.host.guild_count()));
    Ok(Status::Success)
}

pub async fn server_list(ctx: ConsoleContext, fetch_invite: bool) -> HandlerResult {
    let guilds = ctx.host.guilds();
    if guilds.is_empty() {
        ctx.out.error("Bot is not in any servers.");
        return Ok(Status::Failure);
    }

    ctx.out.info("Server list:");

    for guild in guilds {
        let mut line = format!("- {} ({})", guild.name, guild.id);

        if fetch_invite {
            let invites = ctx.host.invites(guild.id).await?;
            match InviteSummary::most_used(&invites) {
                Some(invite) => line.push_str(&format!(": {} ({} uses)", invite.code, invite.uses)),
                None => line.push_str(": No invites found"),
            }
        }

        ctx.out.info(line);
    }

    Ok(Status::Success)
}

pub async fn server_info(ctx: ConsoleContext, guild_id: u64, show_members: bool) -> HandlerResult {
    let Some(guild) = ctx.host.guild(guild_id) else {
        ctx.out.error(format!("Guild with ID {} not found.", guild_id));
        return Ok(Status::Failure);
    };

    ctx.out.info(format!("Server info for {} ({}):", guild.name, guild.id));
    ctx.out.info(format!(
        "- Owner: {} ({})",
        guild.owner.name.as_deref().unwrap_or("Unknown"),
        guild.owner.id
    ));
    if !show_members {
        ctx.out.info(format!("- Members: {}", guild.members.len()));
    }
    ctx.out.info(format!("- Channels: {}", guild.channel_count));
    ctx.out.info(format!("- Roles: {}", guild.role_count));
    ctx.out.info(format!("- Emojis: {}", guild.emoji_count));

    if guild.can_manage {
        match tokio::time::timeout(INVITE_TIMEOUT, ctx.host.invites(guild_id)).await {
            Err(_) => ctx.out.error("Failed to fetch invites in time"),
            Ok(invites) => {
                let invites = invites?;
                if let Some(invite) = InviteSummary::most_used(&invites) {
                    ctx.out.info(format!("- Invite: discord.gg/{} ({} uses)", invite.code, invite.uses));
                }
            }
        }
    }

    if show_members && !guild.members.is_empty() {
        ctx.out.info(format!("Members ({}):", guild.members.len()));
        for member in guild.sorted_members() {
            ctx.out.info(format!("- {}", member));
        }
    }

    Ok(Status::Success)
}

pub async fn create_invite(ctx: ConsoleContext, guild_id: u64) -> HandlerResult {
    let Some(guild) = ctx.host.guild(guild_id) else {
        ctx.out.error(format!("Guild with ID {} not found.", guild_id));
        return Ok(Status::Failure);
    };

    match ctx.host.create_invite(guild_id).await? {
        Some(url) => {
            ctx.out.info(format!("Created invite for guild {}: {}", guild.name, url));
            Ok(Status::Success)
        }
        None => {
            ctx.out.error(format!("No channel found to create invite in guild {}", guild.name));
            Ok(Status::Failure)
        }
    }
}

pub async fn reload(ctx: ConsoleContext, sync_tree: bool) -> HandlerResult {
    ctx.out.info("Reloading extensions");

    let discovered = ctx.discover_extensions().await?;
    for name in ctx.extensions.reload(&discovered, &ctx.extension_context()).await {
        ctx.out.info(format!("Reloaded extension {}", name));
    }

    if sync_tree {
        sync(ctx.clone()).await?;
    }

    ctx.out.info("Successfully reloaded extensions");
    Ok(Status::Success)
}

pub async fn sync(ctx: ConsoleContext) -> HandlerResult {
    let count = ctx.host.sync_commands(ctx.extensions.application_commands()).await?;
    ctx.out.info(format!("Synced tree ({} commands)", count));
    Ok(Status::Success)
}

pub fn clear(ctx: ConsoleContext) -> HandlerResult {
    ctx.history.clear();
    // ANSI: erase display, cursor home
    print!("\x1b[2J\x1b[H");
    ctx.out.info("Cleared console");
    Ok(Status::Success)
}

pub async fn leave(ctx: ConsoleContext, guild_id: u64) -> HandlerResult {
    if ctx.host.guild(guild_id).is_none() {
        ctx.out.error(format!("Guild with ID {} not found.", guild_id));
        return Ok(Status::Failure);
    }

    ctx.host.leave_guild(guild_id).await?;
    ctx.out.info(format!("Left guild {}", guild_id));
    Ok(Status::Success)
}

pub async fn maintenance(ctx: ConsoleContext, status: bool) -> HandlerResult {
    ctx.out.info(format!("Setting maintenance status to {}", status));

    {
        let mut config = ctx.config.write().await;
        config.reload()?;
        config.set("maintenance", status)?;
    }
    ctx.out.info("Successfully set maintenance status");

    reload(ctx.clone(), false).await?;

    ctx.out.info(format!("Set maintenance status to {}", status));
    Ok(Status::Success)
}

pub async fn stop(ctx: ConsoleContext) -> HandlerResult {
    ctx.out.info("Stopping bot...");
    ctx.host.shutdown().await;
    Ok(Status::Success)
}
