//! Per-document settings, loadable from TOML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};

/// Knobs that change how a [`Document`](crate::Document) maintains its trees.
///
/// ```toml
/// renumber_on_remove = true
/// default_var_letter = "x"
/// warn_on_referenced_removal = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Renumber ordered trees to `0..n-1` after a node is removed.
    pub renumber_on_remove: bool,
    /// Variable letter for AMR concepts with no ASCII letter in them.
    pub default_var_letter: char,
    /// Log a warning when a removed node is still referenced by others.
    pub warn_on_referenced_removal: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            renumber_on_remove: true,
            default_var_letter: 'x',
            warn_on_referenced_removal: true,
        }
    }
}

impl DocumentConfig {
    /// Load settings from a TOML file.
    ///
    /// Returns the defaults if the file doesn't exist.
    pub fn load(path: &Path) -> TreeResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| TreeError::Load(format!("failed to read {}: {}", path.display(), e)))?;

        Self::from_toml_str(&content)
            .map_err(|e| TreeError::Load(format!("failed to parse {}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
