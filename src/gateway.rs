//! Command gateway: fire-and-forget commands to the backend.
//!
//! A call only hands the command over. The outcome comes back later as a
//! [`GatewayReply`] on the session's reply channel, tagged with the
//! [`RequestId`] the caller chose, so callers can tell stale replies apart.

mod channel;
mod types;

pub use channel::ChannelGateway;
pub use types::*;

use crate::error::GatewayError;
use crate::library::AlbumId;

pub trait CommandGateway {
    fn search(&self, request: RequestId, query: SearchRequest) -> Result<(), GatewayError>;

    fn album_detail(&self, request: RequestId, album: &AlbumId) -> Result<(), GatewayError>;

    fn start_download(&self, request: RequestId, album: &AlbumId) -> Result<(), GatewayError>;

    fn delete_download(&self, request: RequestId, album: &AlbumId) -> Result<(), GatewayError>;
}
