use super::*;

fn item(name: &str, artist: Option<&str>) -> ResultItem {
    ResultItem {
        id: AlbumId::from("a1"),
        name: name.into(),
        album_artist: artist.map(str::to_string),
        downloaded: false,
    }
}

#[test]
fn format_clock_pads_seconds_and_floors() {
    assert_eq!(format_clock(0.0), "0:00");
    assert_eq!(format_clock(9.99), "0:09");
    assert_eq!(format_clock(61.2), "1:01");
    assert_eq!(format_clock(3725.0), "62:05");
}

#[test]
fn format_clock_treats_garbage_as_zero() {
    assert_eq!(format_clock(-4.0), "0:00");
    assert_eq!(format_clock(f64::NAN), "0:00");
    assert_eq!(format_clock(f64::INFINITY), "0:00");
}

#[test]
fn track_label_is_one_based() {
    let t = Track {
        name: " Intro ".into(),
        playback_url: "/music/01.flac".into(),
    };
    assert_eq!(track_label(0, &t), "1. Intro");
    assert_eq!(track_label(9, &t), "10. Intro");
}

#[test]
fn result_label_skips_blank_artist() {
    assert_eq!(result_label(&item("Kid A", Some("Radiohead")), " - "), "Kid A - Radiohead");
    assert_eq!(result_label(&item("Kid A", Some("  ")), " - "), "Kid A");
    assert_eq!(result_label(&item("Kid A", None), " - "), "Kid A");
}

#[test]
fn album_id_round_trips_through_display() {
    let id = AlbumId::new("abc-123");
    assert_eq!(id.to_string(), "abc-123");
    assert_eq!(id.as_str(), "abc-123");
    assert_eq!(AlbumId::from(String::from("abc-123")), id);
}

#[test]
fn album_track_lookup_is_bounds_checked() {
    let album = Album {
        id: "x".into(),
        name: "X".into(),
        artist: "Y".into(),
        tracks: vec![Track {
            name: "one".into(),
            playback_url: "1".into(),
        }],
        image_url: None,
    };
    assert!(album.has_tracks());
    assert!(album.track(0).is_some());
    assert!(album.track(1).is_none());
}
