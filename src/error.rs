//! Error types for the voice relay

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Console error: {0}")]
    Console(#[from] ConsoleError),

    #[error("Tenant error: {0}")]
    Tenant(#[from] TenantError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire frame errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Sender id too long: {0} bytes")]
    HeaderTooLong(usize),

    #[error("Frame truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Unknown opcode: {0}")]
    UnknownOpCode(u8),

    #[error("Invalid PCM payload length: {0} bytes")]
    InvalidPcmLength(usize),

    #[error("Invalid gain payload length: {0} bytes")]
    InvalidGainLength(usize),

    #[error("Sender id is not valid UTF-8")]
    InvalidSenderId,
}

/// Session registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session already registered: {0}")]
    Duplicate(String),

    #[error("Invalid session id: {0:?}")]
    InvalidId(String),
}

/// Console (RCON) errors
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication rejected")]
    AuthRejected,

    #[error("Timed out waiting for console")]
    Timeout,

    #[error("Packet too large: {0} bytes")]
    PacketTooLarge(usize),

    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    #[error("Console closed the connection")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tenant management errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TenantError {
    #[error("Tenant not found: {0}")]
    NotFound(String),

    #[error("Tenant already exists: {0}")]
    AlreadyExists(String),

    #[error("Missing tenant name")]
    MissingName,

    #[error("Credential mismatch")]
    Unauthorized,

    #[error("Invalid tenant configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;
