//! Application layer errors

use std::time::Duration;
use thiserror::Error;

/// General bot errors.
///
/// This is the error type poise carries through every command, check and
/// event handler. Domain failures travel inside [`BotError::Domain`] so the
/// error router can unwrap them later.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Command is on cooldown, retry after {remaining:?}")]
    Cooldown { remaining: Duration },

    #[error("{0}")]
    Check(String),

    #[error("{0}")]
    BadArgument(String),

    #[error("{0}")]
    Value(String),

    #[error("{0}")]
    MissingAttachment(String),

    /// The bot itself lacks these permissions.
    #[error("Bot is missing permissions: {}", .0.join(", "))]
    BotMissingPermissions(Vec<String>),

    /// Command belongs to an extension that is not loaded.
    #[error("Command '{0}' is not available")]
    Inactive(String),

    #[error("Console error: {0}")]
    Console(#[from] ConsoleError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extension error: {0}")]
    Extension(#[from] ExtensionError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    /// Short name of this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            BotError::Domain(_) => "DomainError",
            BotError::Cooldown { .. } => "Cooldown",
            BotError::Check(_) => "CheckFailure",
            BotError::BadArgument(_) => "BadArgument",
            BotError::Value(_) => "ValueError",
            BotError::MissingAttachment(_) => "MissingAttachment",
            BotError::BotMissingPermissions(_) => "BotMissingPermissions",
            BotError::Inactive(_) => "Inactive",
            BotError::Console(_) => "ConsoleError",
            BotError::Config(_) => "ConfigError",
            BotError::Extension(_) => "ExtensionError",
            BotError::Host(_) => "HostError",
            BotError::Discord(_) => "DiscordError",
            BotError::Io(_) => "IoError",
        }
    }

    /// Kind names from the outermost error down to the innermost wrapped one.
    pub fn trail(&self) -> Vec<&'static str> {
        let mut trail = vec![self.kind()];
        let inner = match self {
            BotError::Domain(e) => Some(e.kind()),
            BotError::Console(e) => Some(e.kind()),
            BotError::Config(e) => Some(e.kind()),
            BotError::Extension(e) => Some(e.kind()),
            BotError::Host(e) => Some(e.kind()),
            _ => None,
        };
        trail.extend(inner);
        trail
    }

    /// Message of the innermost error in the chain.
    pub fn innermost_message(&self) -> String {
        match self {
            BotError::Domain(e) => e.to_string(),
            BotError::Console(e) => e.to_string(),
            BotError::Config(e) => e.to_string(),
            BotError::Extension(e) => e.to_string(),
            BotError::Host(e) => e.to_string(),
            BotError::Discord(e) => e.to_string(),
            BotError::Io(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

/// Closed set of bot-specific failure kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    ResourceNotFound(String),

    #[error("{0}")]
    ExecutableNotFound(String),

    #[error("{0}")]
    Maintenance(String),

    #[error("{}", out_of_range_message(.name, .value, .min, .max, .message))]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
        message: Option<String>,
    },

    #[error("Invalid subcommand")]
    InvalidSubcommand {
        group: String,
        given: Option<String>,
    },

    #[error("{0}")]
    TokenNotFound(String),

    #[error("{0}")]
    LibraryNotFound(String),
}

impl DomainError {
    pub fn maintenance() -> Self {
        DomainError::Maintenance("Bot is under maintenance".to_string())
    }

    pub fn out_of_range(name: impl Into<String>, value: i64, min: i64, max: i64) -> Self {
        DomainError::OutOfRange {
            name: name.into(),
            value,
            min,
            max,
            message: None,
        }
    }

    /// Like [`DomainError::out_of_range`] with a message template.
    ///
    /// `{value}`, `{min_value}` and `{max_value}` are substituted.
    pub fn out_of_range_with(
        name: impl Into<String>,
        value: i64,
        min: i64,
        max: i64,
        template: impl Into<String>,
    ) -> Self {
        DomainError::OutOfRange {
            name: name.into(),
            value,
            min,
            max,
            message: Some(template.into()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::ResourceNotFound(_) => "ResourceNotFound",
            DomainError::ExecutableNotFound(_) => "ExecutableNotFound",
            DomainError::Maintenance(_) => "Maintenance",
            DomainError::OutOfRange { .. } => "OutOfRange",
            DomainError::InvalidSubcommand { .. } => "InvalidSubcommand",
            DomainError::TokenNotFound(_) => "TokenNotFound",
            DomainError::LibraryNotFound(_) => "LibraryNotFound",
        }
    }
}

fn out_of_range_message(
    name: &str,
    value: &i64,
    min: &i64,
    max: &i64,
    template: &Option<String>,
) -> String {
    let (value, min, max) = (*value, *min, *max);
    if let Some(template) = template {
        return template
            .replace("{value}", &value.to_string())
            .replace("{min_value}", &min.to_string())
            .replace("{max_value}", &max.to_string());
    }
    if value < min {
        format!("`{}` must be at least `{}`", name, min)
    } else if value > max {
        format!("`{}` must be at most `{}`", name, max)
    } else {
        format!("`{}` is out of range", name)
    }
}

/// Developer console parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("Command '{0}' not found.")]
    NotFound(String),

    #[error("Expected at most {expected} arguments but got {got}.")]
    TooManyArguments { expected: usize, got: usize },

    #[error("Argument '{name}' must be of type {kind}.")]
    InvalidType { name: String, kind: &'static str },

    #[error("Argument '{0}' is required but not provided.")]
    MissingArgument(String),

    #[error("Unbalanced quotes in '{0}'")]
    Tokenize(String),
}

impl ConsoleError {
    pub fn kind(&self) -> &'static str {
        match self {
            ConsoleError::NotFound(_) => "NotFound",
            ConsoleError::TooManyArguments { .. } => "TooManyArguments",
            ConsoleError::InvalidType { .. } => "InvalidType",
            ConsoleError::MissingArgument(_) => "MissingArgument",
            ConsoleError::Tokenize(_) => "Tokenize",
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { file_name: String, path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Key '{0}' not found")]
    KeyNotFound(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Config file {0} does not hold a JSON object")]
    NotAnObject(String),
}

impl ConfigError {
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::NotFound { .. } => "NotFound",
            ConfigError::Io(_) => "Io",
            ConfigError::Parse(_) => "Parse",
            ConfigError::KeyNotFound(_) => "KeyNotFound",
            ConfigError::InvalidValue { .. } => "InvalidValue",
            ConfigError::NotAnObject(_) => "NotAnObject",
        }
    }
}

/// Chat platform errors surfaced by an [`AdminHost`](crate::domain::traits::AdminHost)
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Channel with ID {0} not found.")]
    ChannelNotFound(u64),

    #[error("Channel with ID {0} is not a text channel.")]
    NotTextChannel(u64),

    #[error("Guild with ID {0} not found.")]
    GuildNotFound(u64),

    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),
}

impl HostError {
    pub fn kind(&self) -> &'static str {
        match self {
            HostError::ChannelNotFound(_) => "ChannelNotFound",
            HostError::NotTextChannel(_) => "NotTextChannel",
            HostError::GuildNotFound(_) => "GuildNotFound",
            HostError::Discord(_) => "Discord",
        }
    }
}

/// Extension loading errors
#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Extension '{0}' is not available")]
    NotFound(String),

    #[error("Extension '{name}' failed to set up: {reason}")]
    Setup { name: String, reason: String },

    #[error("Failed to scan extensions: {0}")]
    Scan(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtensionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtensionError::NotFound(_) => "NotFound",
            ExtensionError::Setup { .. } => "Setup",
            ExtensionError::Scan(_) => "Scan",
            ExtensionError::Internal(_) => "Internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_messages() {
        assert_eq!(
            DomainError::out_of_range("volume", -1, 0, 100).to_string(),
            "`volume` must be at least `0`"
        );
        assert_eq!(
            DomainError::out_of_range("volume", 150, 0, 100).to_string(),
            "`volume` must be at most `100`"
        );
        assert_eq!(
            DomainError::out_of_range_with("volume", 150, 0, 100, "{value} not in {min_value}..{max_value}")
                .to_string(),
            "150 not in 0..100"
        );
    }

    #[test]
    fn trail_unwraps_wrapped_kinds() {
        let err = BotError::Config(ConfigError::KeyNotFound("prefix".into()));
        assert_eq!(err.trail(), vec!["ConfigError", "KeyNotFound"]);
        assert_eq!(err.innermost_message(), "Key 'prefix' not found");

        let err = BotError::Value("bad".into());
        assert_eq!(err.trail(), vec!["ValueError"]);
    }

    #[test]
    fn maintenance_has_default_message() {
        assert_eq!(DomainError::maintenance().to_string(), "Bot is under maintenance");
    }
}
