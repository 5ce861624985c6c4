//! Pre-invocation gates: maintenance mode and per-user cooldowns

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use crate::application::errors::{BotError, DomainError};
use crate::extensions::KURD_DX;
use crate::infrastructure::config::BotSettings;
use crate::plugins::ExtensionManager;

/// Entry point to the developer console; always reachable
pub const CONSOLE_COMMAND: &str = "cs";

/// Reject `command` when maintenance is on and `author` is not a developer
pub fn check_maintenance(settings: &BotSettings, command: &str, author: u64) -> Result<(), DomainError> {
    if command == CONSOLE_COMMAND {
        return Ok(());
    }
    if settings.maintenance && !settings.is_developer(author) {
        return Err(DomainError::maintenance());
    }
    Ok(())
}

/// A command about to run
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub name: &'a str,
    pub qualified_name: &'a str,
    /// Extension that contributed the command
    pub category: Option<&'a str>,
    pub author: u64,
}

/// Gates every command passes before it runs
///
/// Commands of unloaded extensions are [`BotError::Inactive`]. The
/// maintenance gate only applies while the developer tooling is loaded.
/// The cooldown is charged last, so a rejected call costs nothing.
pub fn admit(
    extensions: &ExtensionManager,
    settings: &BotSettings,
    cooldowns: &CooldownTracker,
    invocation: Invocation<'_>,
) -> Result<(), BotError> {
    let extension = invocation.category.unwrap_or_default();
    if !extensions.is_loaded(extension) {
        return Err(BotError::Inactive(invocation.qualified_name.to_string()));
    }

    if extensions.is_loaded(KURD_DX) {
        check_maintenance(settings, invocation.name, invocation.author)?;
    }

    if let Some(cooldown) = settings.cooldown_for(invocation.qualified_name) {
        cooldowns.hit(invocation.qualified_name, invocation.author, cooldown)?;
    }
    Ok(())
}

/// Per-command, per-user cooldowns
#[derive(Debug, Default)]
pub struct CooldownTracker {
    /// When each (command, user) pair may run again
    ready_at: Mutex<HashMap<(String, u64), Instant>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a use of `command` by `user`, or report how long they must wait
    pub fn hit(&self, command: &str, user: u64, cooldown: Duration) -> Result<(), BotError> {
        self.hit_at(command, user, cooldown, Instant::now())
    }

    fn hit_at(&self, command: &str, user: u64, cooldown: Duration, now: Instant) -> Result<(), BotError> {
        let mut ready_at = self.ready_at.lock()
            .map_err(|_| BotError::Value("Lock poisoned".to_string()))?;

        ready_at.retain(|_, at| *at > now);

        let key = (command.to_string(), user);
        if let Some(at) = ready_at.get(&key) {
            return Err(BotError::Cooldown {
                remaining: at.saturating_duration_since(now),
            });
        }

        ready_at.insert(key, now + cooldown);
        Ok(())
    }

    /// Forget the last use so the next invocation goes through
    pub fn reset(&self, command: &str, user: u64) {
        if let Ok(mut ready_at) = self.ready_at.lock() {
            ready_at.remove(&(command.to_string(), user));
        }
    }

    /// Pairs still cooling down
    pub fn len(&self) -> usize {
        self.ready_at.lock().map(|ready_at| ready_at.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(maintenance: bool, developers: Vec<u64>) -> BotSettings {
        BotSettings {
            maintenance,
            developers,
            ..BotSettings::default()
        }
    }

    #[test]
    fn maintenance_blocks_non_developers() {
        let on = settings(true, vec![42]);

        assert_eq!(check_maintenance(&on, "ping", 7), Err(DomainError::maintenance()));
        assert_eq!(check_maintenance(&on, "ping", 42), Ok(()));
        assert_eq!(check_maintenance(&on, CONSOLE_COMMAND, 7), Ok(()));
        assert_eq!(check_maintenance(&on, "csx", 7), Err(DomainError::maintenance()));

        let off = settings(false, vec![]);
        assert_eq!(check_maintenance(&off, "ping", 7), Ok(()));
    }

    #[test]
    fn cooldown_is_per_command_and_user() {
        let tracker = CooldownTracker::new();
        let start = Instant::now();
        let cooldown = Duration::from_secs(10);

        tracker.hit_at("ping", 1, cooldown, start).unwrap();
        tracker.hit_at("ping", 2, cooldown, start).unwrap();
        tracker.hit_at("other", 1, cooldown, start).unwrap();

        let err = tracker.hit_at("ping", 1, cooldown, start + Duration::from_secs(4)).unwrap_err();
        assert!(matches!(err, BotError::Cooldown { remaining } if remaining == Duration::from_secs(6)));

        tracker.hit_at("ping", 1, cooldown, start + Duration::from_secs(10)).unwrap();
    }

    #[test]
    fn expired_cooldowns_are_dropped() {
        let tracker = CooldownTracker::new();
        let start = Instant::now();
        let cooldown = Duration::from_secs(5);

        for user in 0..100 {
            tracker.hit_at("ping", user, cooldown, start).unwrap();
        }
        assert_eq!(tracker.len(), 100);

        tracker.hit_at("ping", 500, cooldown, start + Duration::from_secs(6)).unwrap();
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn reset_lets_the_next_use_through() {
        let tracker = CooldownTracker::new();
        let cooldown = Duration::from_secs(60);

        tracker.hit("ping", 1, cooldown).unwrap();
        assert!(tracker.hit("ping", 1, cooldown).is_err());

        tracker.reset("ping", 1);
        assert!(tracker.hit("ping", 1, cooldown).is_ok());
    }

    mod admission {
        use super::*;
        use std::sync::Arc;
        use crate::domain::test_support::FakeHost;
        use crate::infrastructure::config::Config;
        use crate::application::console::BoxFuture;
        use crate::application::services::CommandFailure;
        use crate::infrastructure::adapters::discord::Command;
        use crate::plugins::{CatalogEntry, Extension, ExtensionContext, Plain};

        const MISC: &str = "extensions.misc";

        fn tooling(_: ExtensionContext) -> BoxFuture<'static, Result<Arc<dyn Extension>, BotError>> {
            Box::pin(async { Ok(Plain::new(KURD_DX)) })
        }

        fn misc(_: ExtensionContext) -> BoxFuture<'static, Result<Arc<dyn Extension>, BotError>> {
            Box::pin(async { Ok(Plain::new(MISC)) })
        }

        fn no_commands() -> Vec<Command> {
            Vec::new()
        }

        fn manager() -> ExtensionManager {
            ExtensionManager::new([
                CatalogEntry::new(KURD_DX, tooling, no_commands),
                CatalogEntry::new(MISC, misc, no_commands),
            ])
        }

        async fn load(manager: &ExtensionManager, dir: &tempfile::TempDir, names: &[&str]) {
            let path = dir.path().join("config.json");
            std::fs::write(&path, "{}").unwrap();
            let ctx = ExtensionContext {
                host: Arc::new(FakeHost::default()),
                config: Config::load(path).unwrap().into_shared(),
            };
            for name in names {
                manager.load(name, &ctx).await.unwrap();
            }
        }

        fn ping(author: u64) -> Invocation<'static> {
            Invocation {
                name: "ping",
                qualified_name: "ping",
                category: Some(MISC),
                author,
            }
        }

        fn with_cooldown(maintenance: bool) -> BotSettings {
            let mut settings = settings(maintenance, vec![42]);
            settings.cooldowns.insert("ping".to_string(), 30);
            settings
        }

        #[tokio::test]
        async fn unloaded_extension_commands_are_ignored() {
            let dir = tempfile::tempdir().unwrap();
            let extensions = manager();
            load(&extensions, &dir, &[KURD_DX]).await;
            let cooldowns = CooldownTracker::new();

            let err = admit(&extensions, &with_cooldown(false), &cooldowns, ping(7)).unwrap_err();
            assert!(matches!(err, BotError::Inactive(ref name) if name == "ping"));
            assert_eq!(CommandFailure::from_bot_error(&err, ""), CommandFailure::Ignored);

            let uncategorized = Invocation { category: None, ..ping(7) };
            assert!(admit(&extensions, &with_cooldown(false), &cooldowns, uncategorized).is_err());
            assert!(cooldowns.is_empty());
        }

        #[tokio::test]
        async fn maintenance_applies_only_with_developer_tooling_loaded() {
            let dir = tempfile::tempdir().unwrap();
            let settings = settings(true, vec![42]);
            let cooldowns = CooldownTracker::new();

            let without = manager();
            load(&without, &dir, &[MISC]).await;
            assert!(admit(&without, &settings, &cooldowns, ping(7)).is_ok());

            let with = manager();
            load(&with, &dir, &[MISC, KURD_DX]).await;
            let err = admit(&with, &settings, &cooldowns, ping(7)).unwrap_err();
            assert!(matches!(err, BotError::Domain(DomainError::Maintenance(_))));
            assert!(admit(&with, &settings, &cooldowns, ping(42)).is_ok());
        }

        #[tokio::test]
        async fn cooldown_is_charged_after_the_gates() {
            let dir = tempfile::tempdir().unwrap();
            let extensions = manager();
            load(&extensions, &dir, &[MISC, KURD_DX]).await;
            let cooldowns = CooldownTracker::new();

            assert!(admit(&extensions, &with_cooldown(true), &cooldowns, ping(7)).is_err());
            assert!(cooldowns.is_empty());

            admit(&extensions, &with_cooldown(false), &cooldowns, ping(7)).unwrap();
            let err = admit(&extensions, &with_cooldown(false), &cooldowns, ping(7)).unwrap_err();
            assert!(matches!(err, BotError::Cooldown { .. }));
        }
    }
}
