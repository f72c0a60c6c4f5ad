//! Configuration loading from yamlenums.toml.
//!
//! The file is optional and lives in the package directory being processed.
//! Command-line flags win over file values; built-in defaults apply last.

use serde::Deserialize;
use std::{fs, path::Path};

use crate::constants::AliasPolicy;
use crate::error::{IoResultExt, YamlenumsError, YamlenumsResult};

/// Name of the per-package configuration file.
pub const CONFIG_FILE: &str = "yamlenums.toml";

/// Default suffix appended to output file base names.
pub const DEFAULT_SUFFIX: &str = "_yamlenums";

/// Main configuration structure for yamlenums.toml.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct YamlenumsConfig {
    /// Prefix added to each output file name.
    pub prefix: Option<String>,
    /// Suffix added to each output file name (before `.go`).
    pub suffix: Option<String>,
    /// Canonical-name policy for aliased values.
    pub alias: Option<AliasPolicy>,
    /// Whether to pipe generated code through gofmt.
    pub gofmt: Option<bool>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub prefix: String,
    pub suffix: String,
    pub alias: AliasPolicy,
    pub gofmt: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: DEFAULT_SUFFIX.to_string(),
            alias: AliasPolicy::default(),
            gofmt: true,
        }
    }
}

impl YamlenumsConfig {
    /// Layer explicit overrides over this file config and the defaults.
    pub fn resolve(&self, overrides: &YamlenumsConfig) -> GenerateOptions {
        let defaults = GenerateOptions::default();
        GenerateOptions {
            prefix: overrides
                .prefix
                .clone()
                .or_else(|| self.prefix.clone())
                .unwrap_or(defaults.prefix),
            suffix: overrides
                .suffix
                .clone()
                .or_else(|| self.suffix.clone())
                .unwrap_or(defaults.suffix),
            alias: overrides.alias.or(self.alias).unwrap_or(defaults.alias),
            gofmt: overrides.gofmt.or(self.gofmt).unwrap_or(defaults.gofmt),
        }
    }
}

/// Loads configuration from yamlenums.toml if it exists.
pub fn load_config(dir: &Path) -> YamlenumsResult<Option<YamlenumsConfig>> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).with_path(&path)?;
    let cfg = toml::from_str(&content).map_err(|e| YamlenumsError::config(&path, e.to_string()))?;
    Ok(Some(cfg))
}
