//! Structured logging setup.
//!
//! Logs go to stderr so they never interleave with whatever the renderer
//! draws on stdout.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;
use crate::error::LoggingError;

/// Build the filter: `RUST_LOG` when set and valid, otherwise the configured
/// directive.
pub fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&settings.filter).map_err(|e| LoggingError::Filter {
        filter: settings.filter.clone(),
        message: e.to_string(),
    })
}

/// Install the global subscriber. Fails instead of panicking when one is
/// already installed.
pub fn init(settings: &LoggingSettings) -> Result<(), LoggingError> {
    let filter = build_filter(settings)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(settings.with_target)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)
}

#[cfg(test)]
mod tests;
