//! Store configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields the default behaviour.

use crate::error::ConfigError;
use crate::membership::MembershipMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Behaviour switches for [`crate::WhiteboardStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// How replacing a canvas's membership treats former members.
    pub membership_mode: MembershipMode,
    /// Shift merged objects and reparented canvases by the merged canvas's
    /// origin, so they keep their on-screen position.
    pub translate_on_merge: bool,
    /// Drop removed objects from the selection.
    pub prune_selection_on_remove: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            membership_mode: MembershipMode::Exact,
            translate_on_merge: true,
            prune_selection_on_remove: true,
        }
    }
}

impl StoreConfig {
    /// The configuration the original client behaved with: additive
    /// membership, no coordinate translation, stale selection ids kept.
    pub fn legacy() -> Self {
        Self {
            membership_mode: MembershipMode::Additive,
            translate_on_merge: false,
            prune_selection_on_remove: false,
        }
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Default config location.
    ///
    /// On Unix: `~/.config/nestboard/config.json`
    /// On Windows: `%APPDATA%\nestboard\config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .map(|base| base.join("nestboard").join(CONFIG_FILE_NAME))
    }
}
