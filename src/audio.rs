//! Audio resources: the seam between the playback controller and whatever
//! actually produces sound.
//!
//! A resource is created per track, reports its progress as
//! [`ResourceEvent`]s tagged with its [`ResourceId`], and is released before
//! the next one is created.

mod player;
mod sink;
mod thread;
mod types;

pub use player::RodioBackend;
pub use types::*;
