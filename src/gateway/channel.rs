use std::sync::mpsc::{self, Receiver, Sender};

use tracing::debug;

use crate::error::GatewayError;
use crate::library::AlbumId;

use super::CommandGateway;
use super::types::{GatewayCommand, RequestId, SearchRequest};

/// Gateway that forwards commands over a channel to a backend worker.
///
/// The worker owns the receiving end and answers on the session's reply
/// channel.
#[derive(Clone)]
pub struct ChannelGateway {
    tx: Sender<GatewayCommand>,
}

impl ChannelGateway {
    /// Create a gateway along with the receiver the backend consumes.
    pub fn new() -> (Self, Receiver<GatewayCommand>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    fn send(&self, cmd: GatewayCommand) -> Result<(), GatewayError> {
        debug!(command = cmd.name(), request = %cmd.request(), "issuing command");
        self.tx.send(cmd).map_err(|_| GatewayError::Disconnected)
    }
}

impl CommandGateway for ChannelGateway {
    fn search(&self, request: RequestId, query: SearchRequest) -> Result<(), GatewayError> {
        self.send(GatewayCommand::Search { request, query })
    }

    fn album_detail(&self, request: RequestId, album: &AlbumId) -> Result<(), GatewayError> {
        self.send(GatewayCommand::AlbumDetail {
            request,
            album: album.clone(),
        })
    }

    fn start_download(&self, request: RequestId, album: &AlbumId) -> Result<(), GatewayError> {
        self.send(GatewayCommand::StartDownload {
            request,
            album: album.clone(),
        })
    }

    fn delete_download(&self, request: RequestId, album: &AlbumId) -> Result<(), GatewayError> {
        self.send(GatewayCommand::DeleteDownload {
            request,
            album: album.clone(),
        })
    }
}
