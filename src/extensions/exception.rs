//! Error notices
//!
//! While this extension is loaded, command failures are answered with a
//! notice embed instead of the framework's default message.

use std::sync::Arc;
use crate::application::errors::BotError;
use crate::application::services::CommandFailure;
use crate::infrastructure::adapters::discord::{reply, Command, Context};
use crate::plugins::{Extension, ExtensionContext, Plain};

pub async fn setup(_ctx: ExtensionContext) -> Result<Arc<dyn Extension>, BotError> {
    Ok(Plain::new(super::EXCEPTION))
}

pub fn commands() -> Vec<Command> {
    Vec::new()
}

/// Answer a classified failure in the invoking channel
///
/// Sends exactly one reply unless the failure is ignored. Unexpected
/// failures are logged again afterwards.
pub async fn handle(ctx: Context<'_>, failure: CommandFailure) {
    let command = &ctx.command().qualified_name;

    if failure.resets_cooldown() {
        ctx.data().cooldowns.reset(command, ctx.author().id.get());
    }

    if let Some(notice) = failure.notice() {
        if let Err(e) = ctx.send(reply::notice_reply(&notice).await).await {
            tracing::error!("Failed to send error notice: {}", e);
        }
    }

    if let CommandFailure::Unexpected { trail, message } = &failure {
        tracing::error!("Unhandled error in command '{}': {} ({})", command, message, trail);
    }
}
