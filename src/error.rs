//! Error types shared across the session engine.
//!
//! Command and bus failures are returned to callers; resource failures are
//! absorbed by the playback controller and surface as a stalled state.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to hand a command to the backend, or a failure the backend reported.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("backend is not accepting commands")]
    Disconnected,

    #[error("backend rejected {command}: {message}")]
    Rejected {
        command: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("event bus is closed")]
    Closed,
}

/// A playback or artwork reference could not be turned into a loadable address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("empty media reference")]
    Empty,

    #[error("unsupported scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("`{reference}` is not a valid URL: {reason}")]
    Malformed { reference: String, reason: String },

    #[error("relative path {} with no media root", .0.display())]
    RelativePath(PathBuf),
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {message}")]
    Decode { path: String, message: String },

    #[error("no audio output device: {0}")]
    Output(String),

    #[error("seek failed: {0}")]
    Seek(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Bus(#[from] BusError),
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter `{filter}`: {message}")]
    Filter { filter: String, message: String },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}
