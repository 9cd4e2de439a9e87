//! Small local key-value store for UI preferences.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::Result;

const PREFS_FILE: &str = "prefs.json";

/// Whether vault secrets are masked.
pub const VAULT_PRIVACY: &str = "karros_vault_privacy";

/// JSON object persisted next to the project config. Values are read fresh
/// on every call; a missing or unreadable file reads as empty.
#[derive(Debug, Clone)]
pub struct Prefs {
    path: Option<PathBuf>,
}

impl Prefs {
    pub fn open(dir: &Path) -> Self {
        Self {
            path: Some(dir.join(PREFS_FILE)),
        }
    }

    /// Preferences that are never written anywhere.
    pub fn ephemeral() -> Self {
        Self { path: None }
    }

    fn load(&self) -> Map<String, Value> {
        let Some(path) = &self.path else {
            return Map::new();
        };
        let Ok(text) = fs::read_to_string(path) else {
            return Map::new();
        };
        match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => map,
            _ => {
                warn!(path = %path.display(), "ignoring malformed preferences file");
                Map::new()
            }
        }
    }

    fn store(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, serde_json::to_string_pretty(map)?)?;
        }
        Ok(())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.load()
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        let mut map = self.load();
        map.insert(key.to_string(), Value::Bool(value));
        self.store(&map)
    }

    /// Flip a flag and return its new value.
    pub fn toggle(&self, key: &str, default: bool) -> Result<bool> {
        let value = !self.get_bool(key, default);
        self.set_bool(key, value)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get_persist() {
        let tmp = TempDir::new().unwrap();
        let prefs = Prefs::open(tmp.path());
        assert!(prefs.get_bool(VAULT_PRIVACY, true));

        prefs.set_bool(VAULT_PRIVACY, false).unwrap();
        assert!(!Prefs::open(tmp.path()).get_bool(VAULT_PRIVACY, true));
    }

    #[test]
    fn test_toggle() {
        let tmp = TempDir::new().unwrap();
        let prefs = Prefs::open(tmp.path());
        assert!(prefs.toggle("flag", false).unwrap());
        assert!(!prefs.toggle("flag", false).unwrap());
    }

    #[test]
    fn test_malformed_file_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(PREFS_FILE), "not json").unwrap();
        let prefs = Prefs::open(tmp.path());
        assert!(prefs.get_bool(VAULT_PRIVACY, true));
        prefs.set_bool(VAULT_PRIVACY, false).unwrap();
        assert!(!prefs.get_bool(VAULT_PRIVACY, true));
    }

    #[test]
    fn test_ephemeral_never_writes() {
        let prefs = Prefs::ephemeral();
        prefs.set_bool("flag", true).unwrap();
        assert!(!prefs.get_bool("flag", false));
    }
}
