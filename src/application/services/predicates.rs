//! Guards evaluated before a command body runs

use std::process::{Command, Stdio};
use crate::application::errors::{BotError, DomainError};
use crate::infrastructure::config::BotSettings;

pub fn require_developer(settings: &BotSettings, author: u64) -> Result<(), BotError> {
    if settings.is_developer(author) {
        Ok(())
    } else {
        Err(BotError::Check("You are not a developer.".to_string()))
    }
}

pub fn require_interaction(is_interaction: bool) -> Result<(), BotError> {
    if is_interaction {
        Ok(())
    } else {
        Err(BotError::Check("This command can only be used in a slash command.".to_string()))
    }
}

/// Whether `<name> -version` runs and exits successfully
pub fn executable_available(name: &str) -> bool {
    Command::new(name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

pub fn require_ffmpeg() -> Result<(), BotError> {
    require_executable("ffmpeg")
}

fn require_executable(name: &str) -> Result<(), BotError> {
    if executable_available(name) {
        Ok(())
    } else {
        Err(DomainError::ExecutableNotFound(format!("{} is not installed.", name)).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn developer_check() {
        let settings = BotSettings {
            developers: vec![42],
            ..BotSettings::default()
        };
        assert!(require_developer(&settings, 42).is_ok());
        assert!(matches!(
            require_developer(&settings, 7),
            Err(BotError::Check(ref msg)) if msg == "You are not a developer."
        ));
    }

    #[test]
    fn interaction_check() {
        assert!(require_interaction(true).is_ok());
        assert!(matches!(require_interaction(false), Err(BotError::Check(_))));
    }

    #[test]
    fn missing_executable_is_a_domain_error() {
        let err = require_executable("kurd-dx-no-such-binary").unwrap_err();
        assert!(matches!(
            err,
            BotError::Domain(DomainError::ExecutableNotFound(ref msg)) if msg == "kurd-dx-no-such-binary is not installed."
        ));
    }
}
