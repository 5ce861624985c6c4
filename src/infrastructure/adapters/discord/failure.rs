//! Framework error handling
//!
//! Poise reports every failure as a [`poise::FrameworkError`]. These are
//! mapped onto [`CommandFailure`] and answered with a notice while the
//! exception extension is loaded; otherwise poise's default handler runs.

use poise::serenity_prelude as serenity;
use crate::application::errors::{BotError, DomainError};
use crate::application::services::CommandFailure;
use crate::extensions::{exception, EXCEPTION};
use super::{Context, Data};

/// Usage line of the invoked command, e.g. `!cs <command>`
pub fn usage(ctx: Context<'_>) -> String {
    let command = ctx.command();
    format!("{}{} {}", ctx.prefix(), command.qualified_name, signature(command))
        .trim_end()
        .to_string()
}

/// `<required> [optional]` for each parameter
pub fn signature(command: &poise::Command<Data, BotError>) -> String {
    command
        .parameters
        .iter()
        .map(|p| {
            if p.required {
                format!("<{}>", p.name)
            } else {
                format!("[{}]", p.name)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn permission_names(permissions: serenity::Permissions) -> Vec<String> {
    permissions
        .get_permission_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Map a framework error onto a failure; `None` leaves it to poise
pub fn classify(error: &poise::FrameworkError<'_, Data, BotError>) -> Option<CommandFailure> {
    use poise::FrameworkError as F;

    let failure = match error {
        F::CooldownHit { remaining_cooldown, .. } => CommandFailure::Cooldown {
            remaining: *remaining_cooldown,
        },
        F::Command { error, ctx, .. } => CommandFailure::from_bot_error(error, &usage(*ctx)),
        F::CommandCheckFailed { error: Some(error), ctx, .. } => {
            CommandFailure::from_bot_error(error, &usage(*ctx))
        }
        F::CommandCheckFailed { error: None, .. } => {
            CommandFailure::Check("A check failed for this command.".to_string())
        }
        F::SubcommandRequired { ctx, .. } => CommandFailure::Domain(DomainError::InvalidSubcommand {
            group: ctx.command().qualified_name.clone(),
            given: None,
        }),
        F::CommandStructureMismatch { description, .. } => {
            CommandFailure::ArgumentTransform(description.to_string())
        }
        F::MissingUserPermissions { missing_permissions, .. } => CommandFailure::MissingPermissions {
            permissions: (*missing_permissions).map(permission_names).unwrap_or_default(),
            by_bot: false,
        },
        F::MissingBotPermissions { missing_permissions, .. } => CommandFailure::MissingPermissions {
            permissions: permission_names(*missing_permissions),
            by_bot: true,
        },
        F::ArgumentParse { error, ctx, .. } => {
            if error.is::<poise::TooFewArguments>() {
                CommandFailure::MissingArgument {
                    message: error.to_string(),
                    usage: usage(*ctx),
                }
            } else {
                CommandFailure::BadArgument(error.to_string())
            }
        }
        F::CommandPanic { payload, .. } => CommandFailure::Unexpected {
            trail: "Panic".to_string(),
            message: payload.clone().unwrap_or_else(|| "No error message".to_string()),
        },
        F::UnknownCommand { .. } => CommandFailure::Ignored,
        _ => return None,
    };
    Some(failure)
}

/// `on_error` hook of the framework
pub async fn on_error(error: poise::FrameworkError<'_, Data, BotError>) {
    let Some(ctx) = error.ctx() else {
        if let poise::FrameworkError::UnknownCommand { .. } = error {
            return;
        }
        report_without_context(error).await;
        return;
    };

    let failure = classify(&error);
    if failure == Some(CommandFailure::Ignored) {
        return;
    }

    let data = ctx.data();
    if !data.extensions.is_loaded(EXCEPTION) {
        fallback(error).await;
        return;
    }
    let Some(failure) = failure else {
        fallback(error).await;
        return;
    };

    exception::handle(ctx, failure).await;
}

async fn report_without_context(error: poise::FrameworkError<'_, Data, BotError>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => tracing::error!("Setup failed: {}", error),
        poise::FrameworkError::EventHandler { error, event, .. } => {
            tracing::error!("Event handler failed on {}: {}", event.snake_case_name(), error)
        }
        other => fallback(other).await,
    }
}

async fn fallback(error: poise::FrameworkError<'_, Data, BotError>) {
    if let Err(e) = poise::builtins::on_error(error).await {
        tracing::error!("Error while handling error: {}", e);
    }
}
