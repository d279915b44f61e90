//! Engine configuration resolution for the harness.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flexsort_core::FlexSortConfig;
use tracing::debug;

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed with `--config`.
    Explicit(PathBuf),
    /// The user config file under the XDG config dir.
    User(PathBuf),
    /// No file found; built-in defaults.
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(path) => write!(f, "{} (--config)", path.display()),
            Self::User(path) => write!(f, "{} (user)", path.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve configuration: explicit path, then user file, then defaults.
    ///
    /// An explicit path that does not exist is an error; a missing user
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<(FlexSortConfig, ConfigSource)> {
        if let Some(path) = explicit {
            let config = FlexSortConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
        }

        let user_path = Self::user_config_path();
        if user_path.exists() {
            let config = FlexSortConfig::load(&user_path)
                .with_context(|| format!("failed to load config from {}", user_path.display()))?;
            return Ok((config, ConfigSource::User(user_path)));
        }

        debug!(path = %user_path.display(), "No user config, using defaults");
        Ok((FlexSortConfig::default(), ConfigSource::Defaults))
    }

    pub fn user_config_path() -> PathBuf {
        flexsort_paths::config_file()
    }
}
