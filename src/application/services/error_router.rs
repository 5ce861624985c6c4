//! Error router - Classifies command failures and renders their notices
//!
//! The framework adapter turns whatever went wrong into a
//! [`CommandFailure`]; this module decides what the user sees. Keeping the
//! classification free of framework types lets it be tested directly.

use std::time::Duration;
use crate::application::errors::{BotError, DomainError};
use crate::domain::entities::Notice;

pub const ERROR_IMAGE: &str = "res/images/error.png";
pub const PERMISSION_IMAGE: &str = "res/images/permission.png";
pub const MAINTENANCE_IMAGE: &str = "res/images/maintenance.png";
pub const UNEXPECTED_IMAGE: &str = "res/images/unexpected_error.png";

/// What went wrong with a command invocation, in routing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandFailure {
    Cooldown { remaining: Duration },
    Domain(DomainError),
    ArgumentTransform(String),
    MissingPermissions { permissions: Vec<String>, by_bot: bool },
    Check(String),
    BadArgument(String),
    Value(String),
    MissingArgument { message: String, usage: String },
    MissingAttachment { message: String, usage: String },
    /// Anything not handled above. `trail` names the wrapped error kinds.
    Unexpected { trail: String, message: String },
    /// Unknown or inactive command, nothing is sent
    Ignored,
}

impl CommandFailure {
    /// Classify an error raised by a command body or check
    ///
    /// `usage` is the invocation usage text, used by missing-attachment.
    pub fn from_bot_error(error: &BotError, usage: &str) -> Self {
        match error {
            BotError::Domain(domain) => match domain {
                DomainError::ResourceNotFound(_)
                | DomainError::ExecutableNotFound(_)
                | DomainError::Maintenance(_)
                | DomainError::OutOfRange { .. }
                | DomainError::InvalidSubcommand { .. } => CommandFailure::Domain(domain.clone()),
                DomainError::TokenNotFound(_) | DomainError::LibraryNotFound(_) => {
                    CommandFailure::unexpected(error)
                }
            },
            BotError::Cooldown { remaining } => CommandFailure::Cooldown { remaining: *remaining },
            BotError::Check(message) => CommandFailure::Check(message.clone()),
            BotError::BadArgument(message) => CommandFailure::BadArgument(message.clone()),
            BotError::Value(message) => CommandFailure::Value(message.clone()),
            BotError::Console(e) => CommandFailure::Value(e.to_string()),
            BotError::MissingAttachment(message) => CommandFailure::MissingAttachment {
                message: message.clone(),
                usage: usage.to_string(),
            },
            BotError::BotMissingPermissions(permissions) => CommandFailure::MissingPermissions {
                permissions: permissions.clone(),
                by_bot: true,
            },
            BotError::Inactive(_) => CommandFailure::Ignored,
            _ => CommandFailure::unexpected(error),
        }
    }

    pub fn unexpected(error: &BotError) -> Self {
        let message = error.innermost_message();
        CommandFailure::Unexpected {
            trail: error.trail().join(" -> "),
            message: if message.is_empty() {
                "No error message".to_string()
            } else {
                message
            },
        }
    }

    /// Every failure but a cooldown hit gives the caller their cooldown back
    pub fn resets_cooldown(&self) -> bool {
        !matches!(self, CommandFailure::Cooldown { .. })
    }

    /// Unexpected failures are logged again after the reply
    pub fn is_unexpected(&self) -> bool {
        matches!(self, CommandFailure::Unexpected { .. })
    }

    /// The notice to reply with; `None` when the failure is ignored
    pub fn notice(&self) -> Option<Notice> {
        let notice = match self {
            CommandFailure::Cooldown { remaining } => Notice::new("Command is on cooldown")
                .with_description(format!("Please try again in `{}`", format_cooldown(*remaining))),
            CommandFailure::Domain(domain) => domain_notice(domain),
            CommandFailure::ArgumentTransform(message) => simple("Transformer Error", message),
            CommandFailure::MissingPermissions { permissions, by_bot } => {
                let who = if *by_bot {
                    "I am missing the following permissions"
                } else {
                    "You are missing the following permissions"
                };
                Notice::new("Permission Error")
                    .with_description(format!("{}```{}```", who, permissions.join(", ")))
                    .with_thumbnail(PERMISSION_IMAGE)
            }
            CommandFailure::Check(message) => simple("Check Failure", message),
            CommandFailure::BadArgument(message) => simple("Argument Error", message),
            CommandFailure::Value(message) => simple("Value Error", message),
            CommandFailure::MissingArgument { message, usage } => {
                simple("Missing Required Argument", message).with_field("Usage", code_block(usage), true)
            }
            CommandFailure::MissingAttachment { message, usage } => {
                simple("Missing Required Attachment", message).with_field("Usage", code_block(usage), true)
            }
            CommandFailure::Unexpected { trail, message } => Notice::new("Unexpected Error")
                .with_field(trail.clone(), code_block(message), false)
                .with_thumbnail(UNEXPECTED_IMAGE),
            CommandFailure::Ignored => return None,
        };
        Some(notice)
    }
}

fn simple(title: &str, description: &str) -> Notice {
    Notice::new(title)
        .with_description(description)
        .with_thumbnail(ERROR_IMAGE)
}

fn code_block(text: impl std::fmt::Display) -> String {
    format!("```{}```", text)
}

fn domain_notice(error: &DomainError) -> Notice {
    match error {
        DomainError::ResourceNotFound(message) => simple("Resource Not Found", message),
        DomainError::ExecutableNotFound(message) => simple("Executable Not Found", message),
        DomainError::Maintenance(message) => Notice::new("Maintenance")
            .with_description(message.clone())
            .with_thumbnail(MAINTENANCE_IMAGE),
        DomainError::OutOfRange { value, min, max, .. } => simple("Out of Range", &error.to_string())
            .with_field("Value", code_block(value), false)
            .with_field("Minimum Value", code_block(min), false)
            .with_field("Maximum Value", code_block(max), false),
        DomainError::InvalidSubcommand { group, given } => {
            let description = match given {
                None => format!("{} group must have a subcommand", group),
                Some(given) => format!("{} group does not have a subcommand named `{}`", group, given),
            };
            simple("Invalid Subcommand", &description)
        }
        DomainError::TokenNotFound(message) | DomainError::LibraryNotFound(message) => {
            simple("Unexpected Error", message)
        }
    }
}

/// Whole-unit breakdown of a cooldown, e.g. `1 hours 5 seconds`
pub fn format_cooldown(remaining: Duration) -> String {
    let total = remaining.as_secs();
    let days = total / 86_400;
    let hours = total % 86_400 / 3_600;
    let minutes = total % 3_600 / 60;
    let seconds = total % 60;

    let parts: Vec<String> = [(days, "days"), (hours, "hours"), (minutes, "minutes"), (seconds, "seconds")]
        .iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| format!("{} {}", amount, unit))
        .collect();

    if parts.is_empty() {
        "0 seconds".to_string()
    } else {
        parts.join(" ")
    }
}
