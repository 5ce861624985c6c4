//! Command checks usable in `#[poise::command(check = ...)]`

use crate::application::errors::BotError;
use crate::application::services::predicates;
use super::Context;

/// Author must be listed in `developers`
pub async fn dev_only(ctx: Context<'_>) -> Result<bool, BotError> {
    let settings = ctx.data().fresh_settings().await?;
    predicates::require_developer(&settings, ctx.author().id.get())?;
    Ok(true)
}

/// Command must be invoked as a slash command
pub async fn slash_command_only(ctx: Context<'_>) -> Result<bool, BotError> {
    predicates::require_interaction(matches!(ctx, poise::Context::Application(_)))?;
    Ok(true)
}

/// `ffmpeg` must be installed
pub async fn ffmpeg_required(_ctx: Context<'_>) -> Result<bool, BotError> {
    tokio::task::spawn_blocking(predicates::require_ffmpeg)
        .await
        .map_err(|e| BotError::Value(e.to_string()))??;
    Ok(true)
}
