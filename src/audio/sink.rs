//! Opening and decoding a track for a `rodio` sink.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::file::AudioFile;
use rodio::{Decoder, Source};

use crate::error::ResourceError;

pub(super) type FileSource = Decoder<BufReader<File>>;

/// Decode `path` and report its length. Containers that don't expose a
/// length through the decoder are probed with `lofty`.
pub(super) fn open_source(path: &Path) -> Result<(FileSource, Option<Duration>), ResourceError> {
    let file = File::open(path).map_err(|source| ResourceError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| ResourceError::Decode {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let duration = decoder.total_duration().or_else(|| probe_duration(path));
    Ok((decoder, duration))
}

fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}
