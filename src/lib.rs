//! Client-side session engine for a music library.
//!
//! A [`session::Session`] keeps three state machines consistent against a
//! backend reachable only through fire-and-forget commands
//! ([`gateway::CommandGateway`]) and push events ([`bus::EventBus`]):
//!
//! - [`downloads::DownloadTracker`]: albums the backend is downloading.
//! - [`playback::PlaybackController`]: the loaded album and its audio resource.
//! - [`search::SearchSession`]: the current result page and its focus marker.
//!
//! [`runtime`] wires these to rodio, MPRIS and a terminal input loop.

pub mod audio;
pub mod bus;
pub mod config;
pub mod downloads;
pub mod error;
pub mod gateway;
pub mod library;
pub mod logging;
pub mod mpris;
pub mod playback;
pub mod resolve;
pub mod runtime;
pub mod search;
pub mod session;

#[cfg(test)]
mod test_support;
