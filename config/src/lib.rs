//! Configuration for callkit.
//!
//! Read from `~/.callkit/config.toml`, or from the file named by the
//! `CALLKIT_CONFIG` environment variable. A missing file is not an error; every
//! field has a default.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "CALLKIT_CONFIG";

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct CallkitConfig {
    /// Guarded resource initialization.
    pub guard: Option<GuardConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GuardConfig {
    /// Skip an asynchronous tester whose token is already cancelled instead
    /// of letting it observe the cancellation itself.
    #[serde(default)]
    pub fail_fast_on_cancel: bool,
    /// Include the tester's resolved descriptor in lifecycle events.
    #[serde(default = "default_true")]
    pub trace_metadata: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            fail_fast_on_cancel: false,
            trace_metadata: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl CallkitConfig {
    /// Load from the default location. `Ok(None)` when no file exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        Self::from_toml_str(&content).map_err(|err| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, err);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source: err,
            }
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Guard settings, falling back to defaults when the table is absent.
    #[must_use]
    pub fn guard(&self) -> GuardConfig {
        self.guard.unwrap_or_default()
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

pub fn config_path() -> Option<PathBuf> {
    resolve_path(env::var_os(CONFIG_ENV), dirs::home_dir())
}

fn resolve_path(overridden: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    match overridden {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => home.map(|home| home.join(".callkit").join("config.toml")),
    }
}
