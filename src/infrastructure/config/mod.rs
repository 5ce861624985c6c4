//! Configuration management
//!
//! A [`Config`] mirrors one JSON document on disk. It can only be obtained
//! through [`Config::load`], and every write is an immediate full-file
//! rewrite.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use crate::application::errors::{ConfigError, DomainError, BotError};

pub const CONFIG_FILE: &str = "config.json";
pub const TOKEN_FILE: &str = "token.json";

/// Config handle shared between the gate, the presence loop and the console
pub type SharedConfig = Arc<RwLock<Config>>;

/// Loaded JSON configuration file
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    indent: usize,
    values: Map<String, Value>,
}

impl Config {
    /// Load a config file from disk
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let values = read_object(&path)?;
        Ok(Self {
            path,
            indent: 4,
            values,
        })
    }

    /// Use a different indent width when saving
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn into_shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file, picking up edits made outside the bot
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        self.values = read_object(&self.path)?;
        Ok(())
    }

    /// Write the whole document back to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let indent = " ".repeat(self.indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.values.serialize(&mut ser)?;
        std::fs::write(&self.path, buf)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Typed read; `Ok(None)` when the key is absent
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.values.get(key) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<(), ConfigError> {
        let value = serde_json::to_value(value)?;
        self.values.insert(key.into(), value);
        self.save()
    }

    pub fn remove(&mut self, key: &str) -> Result<Value, ConfigError> {
        let value = self.values
            .remove(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;
        self.save()?;
        Ok(value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn read_object(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            file_name: file_name(path),
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject(path.display().to_string())),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Typed view over the general config file
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BotSettings {
    #[serde(default = "default_prefix")]
    pub command_prefix: String,

    #[serde(default)]
    pub maintenance: bool,

    #[serde(default)]
    pub developers: Vec<u64>,

    #[serde(default = "default_extensions_dir")]
    pub extensions_dir: PathBuf,

    /// Command name to cooldown in seconds
    #[serde(default)]
    pub cooldowns: HashMap<String, u64>,
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_extensions_dir() -> PathBuf {
    PathBuf::from("src/extensions")
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            command_prefix: default_prefix(),
            maintenance: false,
            developers: Vec::new(),
            extensions_dir: default_extensions_dir(),
            cooldowns: HashMap::new(),
        }
    }
}

impl BotSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        serde_json::from_value(Value::Object(config.values.clone())).map_err(|e| {
            ConfigError::InvalidValue {
                key: file_name(config.path()),
                reason: e.to_string(),
            }
        })
    }

    pub fn is_developer(&self, user_id: u64) -> bool {
        self.developers.contains(&user_id)
    }

    pub fn cooldown_for(&self, command: &str) -> Option<Duration> {
        self.cooldowns
            .get(command)
            .filter(|secs| **secs > 0)
            .map(|secs| Duration::from_secs(*secs))
    }
}

/// Read the bot token from the token file
pub fn load_token(path: impl Into<PathBuf>) -> Result<String, BotError> {
    let config = Config::load(path)?;
    match config.get_as::<String>("token")? {
        Some(token) => Ok(token),
        None => Err(DomainError::TokenNotFound(format!(
            "Token not found in '{}'",
            file_name(config.path())
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn set_survives_a_fresh_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "config.json", "{}");

        let mut config = Config::load(&path).unwrap();
        config.set("developers", vec![1u64, 2, 3]).unwrap();
        config.set("nested", json!({"a": [1, "two", null], "b": 1.5})).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.get("developers"), Some(&json!([1, 2, 3])));
        assert_eq!(reloaded.get("nested"), Some(&json!({"a": [1, "two", null], "b": 1.5})));
        assert_eq!(reloaded.get_as::<Vec<u64>>("developers").unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn saves_with_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "config.json", "{}");

        let mut config = Config::load(&path).unwrap();
        config.set("maintenance", true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n    \"maintenance\": true\n}");
    }

    #[test]
    fn remove_absent_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "config.json", r#"{"a": 1}"#);

        let mut config = Config::load(&path).unwrap();
        assert!(matches!(config.remove("missing"), Err(ConfigError::KeyNotFound(k)) if k == "missing"));
        assert_eq!(config.remove("a").unwrap(), json!(1));
        assert!(!Config::load(&path).unwrap().contains("a"));
    }

    #[test]
    fn missing_file_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { ref file_name, .. } if file_name == "config.json"));
    }

    #[test]
    fn settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "config.json", r#"{"developers": [42], "cooldowns": {"ping": 5}}"#);

        let settings = BotSettings::from_config(&Config::load(&path).unwrap()).unwrap();
        assert_eq!(settings.command_prefix, "!");
        assert!(!settings.maintenance);
        assert!(settings.is_developer(42));
        assert_eq!(settings.cooldown_for("ping"), Some(Duration::from_secs(5)));
        assert_eq!(settings.cooldown_for("other"), None);
    }

    #[test]
    fn missing_token_is_a_domain_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "token.json", "{}");

        let err = load_token(&path).unwrap_err();
        assert!(matches!(
            err,
            BotError::Domain(DomainError::TokenNotFound(ref msg)) if msg == "Token not found in 'token.json'"
        ));

        let path = write(&dir, "token.json", r#"{"token": "abc"}"#);
        assert_eq!(load_token(&path).unwrap(), "abc");
    }
}
