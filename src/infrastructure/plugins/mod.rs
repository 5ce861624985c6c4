//! Extension discovery for kurd-dx
//!
//! Extensions are compiled-in modules under `src/extensions`. The scanner
//! decides which of them are present by reading their source text.

pub mod loader;

pub use loader::{qualified_name, ExtensionScanner, EXTENSION_PACKAGE};
