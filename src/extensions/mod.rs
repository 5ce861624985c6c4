//! Built-in extensions
//!
//! Each extension module declares a module-level `setup` function, which is
//! what discovery looks for, and a `commands` function listing the commands
//! it contributes.

pub mod events;
pub mod exception;
pub mod kurd_dx;
pub mod misc;

use crate::plugins::CatalogEntry;

pub const EVENTS: &str = "extensions.events";
pub const EXCEPTION: &str = "extensions.exception";
pub const KURD_DX: &str = "extensions.kurd_dx";
pub const MISC: &str = "extensions.misc";

/// Every extension compiled into the bot
pub fn catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new(EVENTS, |ctx| Box::pin(events::setup(ctx)), events::commands),
        CatalogEntry::new(EXCEPTION, |ctx| Box::pin(exception::setup(ctx)), exception::commands),
        CatalogEntry::new(KURD_DX, |ctx| Box::pin(kurd_dx::setup(ctx)), kurd_dx::commands),
        CatalogEntry::new(MISC, |ctx| Box::pin(misc::setup(ctx)), misc::commands),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::plugins::ExtensionScanner;

    #[test]
    fn every_source_module_is_discoverable_and_cataloged() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("src/extensions");
        let discovered = ExtensionScanner::new(dir).unwrap().discover().unwrap();

        let mut cataloged: Vec<String> = catalog().iter().map(|e| e.name.to_string()).collect();
        cataloged.sort();
        assert_eq!(discovered, cataloged);
    }

    #[test]
    fn commands_are_unique() {
        let mut names: Vec<String> = catalog()
            .iter()
            .flat_map(|e| (e.commands)())
            .map(|c| c.name)
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
