//! Binary wire codec
//!
//! Every message on a session connection is a single transport message
//! laid out as `[opcode:1][id_len:2 LE][id:id_len][payload:rest]`.
//! The payload carries no length prefix; the transport message boundary
//! is the frame boundary.

pub mod encoder;
pub mod decoder;

pub use encoder::{encode, encode_gain, encode_header, SenderHeader};
pub use decoder::{decode, decode_gain, validate_pcm, Frame};

/// Frame opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Raw audio samples, forwarded verbatim
    Pcm = 0,
    /// 4-byte little-endian f32 gain for the sender's stream
    Gain = 1,
    /// Empty payload, the sender has disconnected
    Delete = 2,
    /// UTF-8 rejection notice sent before close
    Message = 3,
}

impl TryFrom<u8> for OpCode {
    type Error = crate::error::CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OpCode::Pcm),
            1 => Ok(OpCode::Gain),
            2 => Ok(OpCode::Delete),
            3 => Ok(OpCode::Message),
            other => Err(crate::error::CodecError::UnknownOpCode(other)),
        }
    }
}

/// Bytes per PCM sample (f32)
pub const BYTES_PER_SAMPLE: usize = 4;

/// Minimum number of samples an inbound audio frame must carry
pub const MIN_PCM_SAMPLES: usize = 10;
