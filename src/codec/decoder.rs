//! Frame decoding and inbound audio validation

use bytes::Bytes;

use super::{OpCode, BYTES_PER_SAMPLE, MIN_PCM_SAMPLES};
use crate::error::CodecError;

/// A parsed wire frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub op: OpCode,
    pub sender: String,
    pub payload: Bytes,
}

/// Parse a complete frame
pub fn decode(data: &[u8]) -> Result<Frame, CodecError> {
    if data.len() < 3 {
        return Err(CodecError::Truncated {
            expected: 3,
            actual: data.len(),
        });
    }

    let op = OpCode::try_from(data[0])?;
    let id_len = u16::from_le_bytes([data[1], data[2]]) as usize;
    let payload_start = 3 + id_len;

    if data.len() < payload_start {
        return Err(CodecError::Truncated {
            expected: payload_start,
            actual: data.len(),
        });
    }

    let sender = std::str::from_utf8(&data[3..payload_start])
        .map_err(|_| CodecError::InvalidSenderId)?
        .to_string();

    Ok(Frame {
        op,
        sender,
        payload: Bytes::copy_from_slice(&data[payload_start..]),
    })
}

/// Read the f32 carried by a GAIN payload
pub fn decode_gain(payload: &[u8]) -> Result<f32, CodecError> {
    let bytes: [u8; 4] = payload
        .try_into()
        .map_err(|_| CodecError::InvalidGainLength(payload.len()))?;
    Ok(f32::from_le_bytes(bytes))
}

/// Validate a raw inbound audio payload, returning its sample count.
///
/// The payload must be a whole number of 4-byte samples and carry at
/// least [`MIN_PCM_SAMPLES`] of them.
pub fn validate_pcm(payload: &[u8]) -> Result<usize, CodecError> {
    let len = payload.len();
    if len % BYTES_PER_SAMPLE != 0 || len / BYTES_PER_SAMPLE < MIN_PCM_SAMPLES {
        return Err(CodecError::InvalidPcmLength(len));
    }
    Ok(len / BYTES_PER_SAMPLE)
}
