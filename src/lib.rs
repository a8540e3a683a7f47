//! # Spatial Voice Relay
//!
//! Proximity voice chat relay for multiplayer game servers.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                              RELAY PROCESS                                   │
//! │                                                                             │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐                     │
//! │  │  Browser A   │   │  Browser B   │   │  Browser C   │   WebSocket         │
//! │  └──────┬───────┘   └──────┬───────┘   └──────┬───────┘   /websocket        │
//! │         │ PCM ▲ PCM/GAIN/DELETE                │                             │
//! │         ▼     │            ▼                   ▼                             │
//! │  ┌─────────────────────────────────────────────────────────────────────┐   │
//! │  │                 Relay Dispatcher (relay::dispatcher)                 │   │
//! │  │   receive loop ─► relay_pcm        gain loop ─► broadcast_gains      │   │
//! │  └────────────────────────────┬────────────────────────────────────────┘   │
//! │                               │ snapshot / update                           │
//! │  ┌────────────────────────────▼────────────────────────────────────────┐   │
//! │  │          Tenant Registry (tenant) ─► Session Registry (session)      │   │
//! │  │   name ─► { config, sessions, console state, sync task }             │   │
//! │  └────────────────────────────▲────────────────────────────────────────┘   │
//! │                               │ position / dimension / exists               │
//! │  ┌────────────────────────────┴────────────────────────────────────────┐   │
//! │  │   Scheduler ─► Position Synchronizer (position) ─► Console (network) │   │
//! │  └─────────────────────────────────────────────────────────────────────┘   │
//! │                                     │                                       │
//! └─────────────────────────────────────┼───────────────────────────────────────┘
//!                                       │ RCON over TCP
//!                                       ▼
//!                               ┌───────────────┐
//!                               │  Game Server  │
//!                               └───────────────┘
//! ```

pub mod audio;
pub mod codec;
pub mod config;
pub mod error;
pub mod network;
pub mod position;
pub mod relay;
pub mod session;
pub mod tenant;
pub mod ui;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Distance within which gain is 1
    pub const DEFAULT_FADEOUT: f64 = 3.0;

    /// Distance at or beyond which gain is 0
    pub const DEFAULT_MUTE: f64 = 15.0;

    /// Backoff multiplier between console login attempts
    pub const DEFAULT_BACKOFF_UNIT_SECS: u64 = 5;

    /// Shared tick of the synchronizer and gain broadcast
    pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 1000;

    /// Frames buffered per session before dropping
    pub const DEFAULT_OUTBOUND_QUEUE: usize = 256;

    /// Default HTTP port for the web UI and connection endpoint
    pub const DEFAULT_HTTP_PORT: u16 = 1031;

    /// Console I/O timeout
    pub const DEFAULT_IO_TIMEOUT_MS: u64 = 5000;
}
