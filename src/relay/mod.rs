//! Relay dispatcher
//!
//! Per session, two duties run from connect to disconnect: a gain
//! broadcast on the shared tick, and a receive loop multicasting the
//! session's audio to its peers. Relaying is best-effort; a slow or broken
//! peer only loses its own frames.

pub mod dispatcher;
pub mod handshake;

use std::time::Duration;

pub use dispatcher::{broadcast_gains, relay_pcm, run_session, teardown, SessionGuard};
pub use handshake::{admit, rejection_frame, Rejection};

/// Relay behaviour shared by every session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySettings {
    /// Gain broadcast tick, shared with the position synchronizer
    pub update_interval: Duration,
    /// Bypass existence filtering on both send and receive paths
    pub debug: bool,
    /// Outbound frames buffered per session before dropping
    pub outbound_queue: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_millis(crate::constants::DEFAULT_UPDATE_INTERVAL_MS),
            debug: false,
            outbound_queue: crate::constants::DEFAULT_OUTBOUND_QUEUE,
        }
    }
}
