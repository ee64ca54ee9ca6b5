use std::path::PathBuf;

use serde::Deserialize;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tapedeck/config.toml` or `~/.config/tapedeck/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TAPEDECK__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub audio: AudioSettings,
    pub controls: ControlsSettings,
    pub library: LibrarySettings,
    pub media_session: MediaSessionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of albums requested per page.
    pub page_size: usize,
    /// Whether the session starts browsing the remote catalog.
    pub start_online: bool,
    /// Summary shown when the query is empty.
    pub recently_added_label: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: 50,
            start_online: false,
            recently_added_label: "recently added".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// How often an audio resource reports its position and checks for the
    /// end of the track (milliseconds).
    pub poll_interval_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Input poll timeout of the host loop (milliseconds).
    pub input_poll_ms: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            input_poll_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Base directory for relative playback references.
    pub media_root: Option<PathBuf>,
    /// URL schemes passed through to audio resources unchanged.
    pub allowed_schemes: Vec<String>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            media_root: None,
            allowed_schemes: vec!["file".into(), "http".into(), "https".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaSessionSettings {
    /// Publish now-playing data and accept media keys over MPRIS.
    pub enabled: bool,
    /// Well-known D-Bus name to request.
    pub bus_name: String,
    /// Player name shown by MPRIS clients.
    pub identity: String,
}

impl Default for MediaSessionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bus_name: "org.mpris.MediaPlayer2.tapedeck".to_string(),
            identity: "tapedeck".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
    /// Include the event target (module path) in each line.
    pub with_target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            with_target: false,
        }
    }
}
