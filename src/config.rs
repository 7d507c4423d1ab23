//! `sqlbridge.toml` settings.
//!
//! ```toml
//! source = "presto"
//! destination = "hive"
//! verbose = true
//! color = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::Dialect;

const LOCAL_CONFIG: &str = "sqlbridge.toml";

/// Settings read from a config file. Unset keys fall back to the defaults
/// of the accessors below; command-line flags override both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: Option<Dialect>,
    pub destination: Option<Dialect>,
    pub verbose: Option<bool>,
    pub color: Option<bool>,
}

impl Config {
    pub fn from_toml(content: &str) -> TranslateResult<Self> {
        toml::from_str(content).map_err(|e| TranslateError::config(e.to_string()))
    }

    /// Load the first config found: `explicit` (which must exist), then
    /// `./sqlbridge.toml`, then the user config directory.
    pub fn load(explicit: Option<&Path>) -> TranslateResult<Self> {
        if let Some(path) = explicit {
            let content = fs::read_to_string(path)
                .map_err(|e| TranslateError::config(format!("cannot read {}: {e}", path.display())))?;
            return Self::from_toml(&content);
        }
        for path in Self::search_paths() {
            if path.is_file() {
                debug!(path = %path.display(), "loading config");
                return Self::from_toml(&fs::read_to_string(&path)?);
            }
        }
        Ok(Self::default())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sqlbridge").join("config.toml"));
        }
        paths
    }

    pub fn source(&self) -> Dialect {
        self.source.unwrap_or(Dialect::Presto)
    }

    pub fn destination(&self) -> Dialect {
        self.destination.unwrap_or(Dialect::Hive)
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(true)
    }

    pub fn color(&self) -> bool {
        self.color.unwrap_or(true)
    }
}
