//! Where settings come from: an optional TOML file, then `TAPEDECK__*`
//! environment variables on top, with struct defaults for anything unset.

use std::env;
use std::path::PathBuf;

use ::config::{Config, ConfigError, Environment, File};

use super::schema::Settings;

const ENV_PREFIX: &str = "TAPEDECK";
const CONFIG_PATH_VAR: &str = "TAPEDECK_CONFIG_PATH";

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = resolve_config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject values the session cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.search.page_size == 0 {
            return Err("search.page_size must be >= 1".to_string());
        }
        if self.audio.poll_interval_ms == 0 {
            return Err("audio.poll_interval_ms must be >= 1".to_string());
        }
        if self.controls.input_poll_ms == 0 {
            return Err("controls.input_poll_ms must be >= 1".to_string());
        }
        if let Some(root) = self.library.media_root.as_ref().filter(|r| r.is_relative()) {
            return Err(format!(
                "library.media_root must be absolute, got {}",
                root.display()
            ));
        }
        if let Some(bad) = self.library.allowed_schemes.iter().find(|s| !is_scheme(s)) {
            return Err(format!("library.allowed_schemes has invalid entry `{bad}`"));
        }
        Ok(())
    }
}

/// URL scheme syntax: a letter, then letters, digits, `+`, `-` or `.`.
fn is_scheme(s: &str) -> bool {
    let s = s.trim();
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// `TAPEDECK_CONFIG_PATH` if set, otherwise [`default_config_path`].
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `$XDG_CONFIG_HOME/tapedeck/config.toml`, or `~/.config/tapedeck/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("tapedeck").join("config.toml"))
}
