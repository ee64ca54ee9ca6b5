use crate::library::AlbumId;

/// Coarse controller state.
///
/// `Loaded` covers a track whose resource is still becoming ready, or one
/// that stalled before it ever played.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Empty,
    Loaded,
    Playing,
    Paused,
}

/// Snapshot of the derived playback state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    pub album: Option<AlbumId>,
    /// `None` iff no album is loaded or it has no tracks.
    pub track_index: Option<usize>,
    /// Mirrors the resource's reported play/pause state.
    pub is_playing: bool,
    pub current_time_secs: f64,
    pub duration_secs: f64,
    pub status: PlaybackStatus,
}
