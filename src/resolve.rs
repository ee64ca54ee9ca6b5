//! Mapping backend-local media references to loadable addresses.

use std::path::{Path, PathBuf};

use url::Url;

use crate::config::LibrarySettings;
use crate::error::ResolveError;

/// Rewrites a backend reference (track playback reference, artwork) into an
/// address an audio resource or media session can load.
pub trait UrlResolver {
    fn resolve(&self, reference: &str) -> Result<String, ResolveError>;
}

/// Resolves bare paths to `file://` URLs and passes through references that
/// already carry an allowed scheme.
#[derive(Debug, Clone)]
pub struct FileUrlResolver {
    root: Option<PathBuf>,
    allowed_schemes: Vec<String>,
}

impl FileUrlResolver {
    pub fn new(root: Option<PathBuf>, allowed_schemes: Vec<String>) -> Self {
        Self {
            root,
            allowed_schemes: allowed_schemes
                .into_iter()
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn from_settings(settings: &LibrarySettings) -> Self {
        Self::new(settings.media_root.clone(), settings.allowed_schemes.clone())
    }

    fn absolutize(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl UrlResolver for FileUrlResolver {
    fn resolve(&self, reference: &str) -> Result<String, ResolveError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ResolveError::Empty);
        }

        if let Some(scheme) = scheme_of(reference)? {
            if self.allowed_schemes.iter().any(|s| *s == scheme) {
                return Ok(reference.to_string());
            }
            return Err(ResolveError::UnsupportedScheme(scheme));
        }

        let path = self.absolutize(Path::new(reference));
        Url::from_file_path(&path)
            .map(String::from)
            .map_err(|()| ResolveError::RelativePath(path))
    }
}

/// Lowercased scheme of `reference` when it is written as `scheme://...`.
///
/// Anything without `://` is a path, so a file named `Live: 1999.flac` is
/// never mistaken for a URL.
pub fn scheme_of(reference: &str) -> Result<Option<String>, ResolveError> {
    if !reference.contains("://") {
        return Ok(None);
    }
    let url = Url::parse(reference).map_err(|e| ResolveError::Malformed {
        reference: reference.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Some(url.scheme().to_string()))
}

/// Local filesystem path behind a `file://` URL. Returns `None` for any other
/// scheme and for file URLs naming a remote host.
pub fn file_url_to_path(url: &str) -> Option<PathBuf> {
    let url = Url::parse(url).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}
