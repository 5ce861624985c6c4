//! Extension discovery - Finds extension modules in a source directory
//!
//! A file counts as an extension when its text declares a module-level
//! `async fn setup(`. The file is only read, never compiled or executed.

use std::path::{Path, PathBuf};
use regex_lite::Regex;
use crate::application::errors::ExtensionError;

/// Qualified-name prefix shared by every extension
pub const EXTENSION_PACKAGE: &str = "extensions";

const SETUP_PATTERN: &str = r"(?m)^\s*(pub\s+)?async\s+fn\s+setup\s*\(";

/// Scans a directory for extension modules
pub struct ExtensionScanner {
    dir: PathBuf,
    pattern: Regex,
}

impl ExtensionScanner {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ExtensionError> {
        let pattern = Regex::new(SETUP_PATTERN)
            .map_err(|e| ExtensionError::Internal(format!("Invalid setup pattern: {}", e)))?;
        Ok(Self {
            dir: dir.into(),
            pattern,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a source text declares a setup function
    pub fn declares_setup(&self, source: &str) -> bool {
        self.pattern.is_match(source)
    }

    /// Qualified names of every extension in the directory, sorted
    pub fn discover(&self) -> Result<Vec<String>, ExtensionError> {
        let mut names = Vec::new();

        if !self.dir.exists() {
            tracing::warn!("Extension directory does not exist: {}", self.dir.display());
            return Ok(names);
        }

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("rs") {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Private helpers and mod.rs are never extensions
            if stem.starts_with('_') || stem == "mod" {
                continue;
            }

            match std::fs::read_to_string(&path) {
                Ok(source) if self.declares_setup(&source) => {
                    names.push(qualified_name(stem));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

/// `misc` -> `extensions.misc`
pub fn qualified_name(stem: &str) -> String {
    format!("{}.{}", EXTENSION_PACKAGE, stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn discovers_only_files_declaring_setup() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "misc.rs", "pub async fn setup(ctx: ExtensionContext) {}\n");
        write(&dir, "events.rs", "use x;\n\n  async fn setup (ctx: C) {}\n");
        write(&dir, "helpers.rs", "pub fn setup() {}\n");
        write(&dir, "_template.rs", "pub async fn setup(ctx: ExtensionContext) {}\n");
        write(&dir, "mod.rs", "pub async fn setup(ctx: ExtensionContext) {}\n");
        write(&dir, "notes.txt", "pub async fn setup(ctx: ExtensionContext) {}\n");
        std::fs::create_dir(dir.path().join("nested.rs")).unwrap();

        let scanner = ExtensionScanner::new(dir.path()).unwrap();
        assert_eq!(scanner.discover().unwrap(), vec!["extensions.events", "extensions.misc"]);
    }

    #[test]
    fn setup_inside_a_comment_line_does_not_count() {
        let scanner = ExtensionScanner::new("unused").unwrap();
        assert!(!scanner.declares_setup("// call async fn setup(ctx) first"));
        assert!(!scanner.declares_setup("fn teardown() {}"));
        assert!(scanner.declares_setup("pub async fn setup(\n    ctx: ExtensionContext,\n)"));
    }

    #[test]
    fn missing_directory_discovers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = ExtensionScanner::new(dir.path().join("absent")).unwrap();
        assert!(scanner.discover().unwrap().is_empty());
    }
}
