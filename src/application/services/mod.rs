//! Application services - Bot administration and command guards

pub mod admin;
pub mod error_router;
pub mod maintenance;
pub mod predicates;

pub use admin::{register_commands, ConsoleContext};
pub use error_router::{format_cooldown, CommandFailure};
pub use maintenance::{admit, check_maintenance, CooldownTracker, Invocation, CONSOLE_COMMAND};
