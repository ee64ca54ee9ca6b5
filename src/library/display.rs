use super::model::{ResultItem, Track};

/// Format a position in seconds as `m:ss`.
///
/// Negative and non-finite inputs render as `0:00`; minutes are not wrapped
/// into hours.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// One-based numbered label for a track at `index` within its album.
pub fn track_label(index: usize, track: &Track) -> String {
    format!("{}. {}", index + 1, track.name.trim())
}

/// Label for a search row: album name, followed by the artist when known.
pub fn result_label(item: &ResultItem, sep: &str) -> String {
    match item
        .album_artist
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
    {
        Some(artist) => format!("{}{}{}", item.name.trim(), sep, artist),
        None => item.name.trim().to_string(),
    }
}
