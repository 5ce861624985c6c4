//! Extension system for kurd-dx
//!
//! Extensions ("cogs") contribute commands and event handlers. Which of
//! them are present is decided by scanning the extension directory; the
//! manager then loads, reloads and unloads them by qualified name.

pub mod manager;
pub mod trait_def;

pub use manager::ExtensionManager;
pub use trait_def::{CatalogEntry, CommandsFn, Extension, ExtensionContext, Plain, SetupFn};
