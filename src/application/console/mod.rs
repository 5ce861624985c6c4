//! Developer console - Text commands mapped to bot administration
//!
//! A raw line is routed to the registered command with the longest name
//! that prefixes it, the remainder is split with shell quoting rules and
//! each token is coerced to the declared parameter kind.

pub mod command;
pub mod dispatcher;

pub use command::{ArgValue, BoxFuture, ConsoleCommand, HandlerResult, Param, ParamKind, ParsedArgs, Status};
pub use dispatcher::Console;
