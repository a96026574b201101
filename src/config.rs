//! Client configuration.
//!
//! Sources, lowest precedence first: built-in defaults, `config.json` in the
//! user config directory, then environment variables:
//! - `STICKIES_URL` - notes collection URL (default: `http://localhost:5000/notes`)
//! - `STICKIES_DATA_DIR` - directory of the local mirror
//! - `STICKIES_TIMEOUT_SECS` - per-request timeout; unset means none

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::remote::DEFAULT_URL;

const APP_NAME: &str = "stickies";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL of the remote notes collection
    pub remote_url: String,
    /// Directory holding the local mirror; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    /// Per-request timeout in seconds; no timeout when unset
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_url: DEFAULT_URL.to_string(),
            data_dir: None,
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load from the user's config file and the process environment.
    /// A missing or invalid file means defaults.
    pub fn load() -> Self {
        let config = match get_config_path().and_then(|path| Self::from_file(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Read a config file. A file that does not exist yields defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("STICKIES_URL") {
            self.remote_url = url;
        }
        if let Some(dir) = lookup("STICKIES_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = lookup("STICKIES_TIMEOUT_SECS") {
            match secs.trim().parse() {
                Ok(secs) => self.request_timeout_secs = Some(secs),
                Err(_) => tracing::warn!("Ignoring invalid STICKIES_TIMEOUT_SECS: {}", secs),
            }
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_point_at_local_service() {
        let config = Config::default();
        assert_eq!(config.remote_url, "http://localhost:5000/notes");
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"request_timeout_secs": 5}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.remote_url, DEFAULT_URL);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let config = Config::default().with_env(env(&[
            ("STICKIES_URL", "http://notes.internal/notes"),
            ("STICKIES_DATA_DIR", "/tmp/stickies"),
            ("STICKIES_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(config.remote_url, "http://notes.internal/notes");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/stickies")));
        assert_eq!(config.request_timeout_secs, Some(30));
    }

    #[test]
    fn test_bad_timeout_is_ignored() {
        let config = Config::default().with_env(env(&[("STICKIES_TIMEOUT_SECS", "soon")]));
        assert!(config.request_timeout_secs.is_none());
    }
}
