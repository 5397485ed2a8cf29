//! Configuration loading from prunedecl.toml.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{IoResultExt, PruneError};

/// File name looked up next to the source being reduced.
pub const CONFIG_FILE: &str = "prunedecl.toml";

/// Main configuration structure for prunedecl.toml.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct PruneConfig {
    /// Offer every candidate as one instance.
    pub all_at_once: Option<bool>,
    /// Regexes over declaration file names that are never edited.
    pub protected: Option<Vec<String>>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl PruneConfig {
    /// Whether the configured output format is JSON.
    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// Loads configuration from prunedecl.toml in `dir` if it exists.
pub fn load_config(dir: &Path) -> Result<Option<PruneConfig>> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Loads configuration from an explicit path.
///
/// Read failures surface as [`PruneError::Io`], malformed TOML as
/// [`PruneError::Config`].
pub fn load_config_file(path: &Path) -> Result<PruneConfig> {
    let content = fs::read_to_string(path).with_path(path)?;
    let cfg = toml::from_str(&content).map_err(|e| PruneError::config(path, e.message()))?;
    Ok(cfg)
}
