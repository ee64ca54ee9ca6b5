//! Library data as the backend describes it: albums, their tracks and the
//! rows a search returns, plus small display helpers used by renderers.

mod display;
mod model;

pub use display::{format_clock, result_label, track_label};
pub use model::*;

#[cfg(test)]
mod tests;
