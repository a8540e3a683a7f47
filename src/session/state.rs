//! Per-session state

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::audio::Position;
use crate::codec::SenderHeader;

/// Outbound half of a session connection.
///
/// Frames pushed here are drained by the connection's writer task.
pub type Outbound = mpsc::Sender<Bytes>;

/// What the console last reported about a session's in-game entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialState {
    /// Last-known position
    pub position: Position,
    /// Last-known dimension tag (opaque)
    pub dimension: String,
    /// Whether the entity currently exists in the game
    pub exists: bool,
}

/// One connected client within a tenant
#[derive(Debug, Clone)]
pub struct Session {
    /// Client-chosen id, unique within the tenant
    pub id: String,
    /// Precomputed sender header for frames this session originates
    pub header: SenderHeader,
    /// Connection handle
    pub outbound: Outbound,
    /// Fields written by the position synchronizer
    pub spatial: SpatialState,
}

impl Session {
    pub fn new(id: impl Into<String>, header: SenderHeader, outbound: Outbound) -> Self {
        Self {
            id: id.into(),
            header,
            outbound,
            spatial: SpatialState::default(),
        }
    }

    /// Queue a frame without waiting.
    ///
    /// Fails when the queue is full or the connection is gone; the frame
    /// is dropped either way.
    pub fn send(&self, frame: Bytes) -> Result<(), mpsc::error::TrySendError<Bytes>> {
        self.outbound.try_send(frame)
    }
}
