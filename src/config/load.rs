use std::{env, path::PathBuf};

use crate::error::{LibraryError, Result};

use super::schema::Settings;

impl Settings {
    /// Environment overrides win over the config file, which wins over the
    /// struct defaults. A missing file is not an error.
    pub fn load() -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = resolve_config_path() {
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        let overrides = ::config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true);

        Ok(builder.add_source(overrides).build()?.try_deserialize()?)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<()> {
        if self
            .library
            .extensions
            .iter()
            .all(|e| e.trim().trim_start_matches('.').is_empty())
        {
            return Err(LibraryError::InvalidConfig(
                "library.extensions must name at least one extension".to_string(),
            ));
        }
        if self.library.max_depth == Some(0) {
            return Err(LibraryError::InvalidConfig(
                "library.max_depth must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Names the config file explicitly, bypassing the XDG lookup.
pub const CONFIG_PATH_ENV: &str = "TUNESHELF_CONFIG_PATH";
/// Prefix of per-key overrides, e.g. `TUNESHELF__RECONCILE__INTERVAL_SECS`.
pub const ENV_PREFIX: &str = "TUNESHELF";
const APP_DIR: &str = "tuneshelf";
const CONFIG_FILE: &str = "config.toml";

/// Non-empty value of the environment variable `key`.
fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// The config file to read: `$TUNESHELF_CONFIG_PATH` when set, otherwise
/// [`default_config_path`].
pub fn resolve_config_path() -> Option<PathBuf> {
    env_path(CONFIG_PATH_ENV).or_else(default_config_path)
}

/// `$XDG_CONFIG_HOME/tuneshelf/config.toml`, or `~/.config/...` when
/// `XDG_CONFIG_HOME` is unset or empty. `None` without either variable.
pub fn default_config_path() -> Option<PathBuf> {
    env_path("XDG_CONFIG_HOME")
        .or_else(|| env_path("HOME").map(|home| home.join(".config")))
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
