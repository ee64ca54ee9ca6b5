//! Album playback: the controller that owns the loaded album and its single
//! live audio resource.

mod controller;
mod state;

pub use controller::PlaybackController;
pub use state::{PlaybackState, PlaybackStatus};
