//! Frame encoding
//!
//! The sender header is computed once per session at connect time and
//! reused for every frame that session originates.

use bytes::{BufMut, Bytes, BytesMut};

use super::OpCode;
use crate::error::CodecError;

/// Precomputed `[id_len:2 LE][id]` header for one sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderHeader(Bytes);

impl SenderHeader {
    /// Header with a zero-length id
    pub fn empty() -> Self {
        SenderHeader(Bytes::from_static(&[0, 0]))
    }

    /// Raw header bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Header length on the wire
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the header carries no id bytes
    pub fn is_empty(&self) -> bool {
        self.0.len() <= 2
    }
}

/// Build the header for a sender id
pub fn encode_header(id: &str) -> Result<SenderHeader, CodecError> {
    let len = u16::try_from(id.len()).map_err(|_| CodecError::HeaderTooLong(id.len()))?;

    let mut buf = BytesMut::with_capacity(2 + id.len());
    buf.put_u16_le(len);
    buf.put_slice(id.as_bytes());

    Ok(SenderHeader(buf.freeze()))
}

/// Concatenate opcode, header and payload into one frame
pub fn encode(op: OpCode, header: &SenderHeader, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + header.len() + payload.len());
    buf.put_u8(op as u8);
    buf.put_slice(header.as_bytes());
    buf.put_slice(payload);
    buf.freeze()
}

/// Build a GAIN frame for `header`'s stream
pub fn encode_gain(header: &SenderHeader, gain: f32) -> Bytes {
    encode(OpCode::Gain, header, &gain.to_le_bytes())
}
