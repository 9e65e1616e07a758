//! Binary codec for stored payloads
//!
//! Converts between the typed `Payload` and the single framed byte buffer
//! the store persists. Frame layout (version 1):
//!
//! ```text
//! [0]      frame version byte
//! [1..3]   media type length, big-endian u16
//! [3..3+n] media type, UTF-8
//! [3+n..]  image body
//! ```
//!
//! Decoding is the store's corruption probe: a record whose frame no longer
//! decodes cannot be reconstructed.

use thiserror::Error;

use crate::domain::entities::Payload;

/// Current frame version
pub const FRAME_VERSION: u8 = 1;

const HEADER_LEN: usize = 3;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("frame is truncated")]
    Truncated,

    #[error("unsupported frame version: {0}")]
    UnsupportedVersion(u8),

    #[error("declared media type overruns the frame")]
    MimeOverrun,

    #[error("media type is not valid UTF-8")]
    MimeEncoding,

    #[error("frame carries an empty body")]
    EmptyBody,
}

/// Encode a payload into its framed buffer.
pub fn encode(payload: &Payload) -> Vec<u8> {
    let mime = payload.content_type.as_bytes();
    debug_assert!(mime.len() <= u16::MAX as usize);

    let mut buf = Vec::with_capacity(HEADER_LEN + mime.len() + payload.bytes.len());
    buf.push(FRAME_VERSION);
    buf.extend_from_slice(&(mime.len() as u16).to_be_bytes());
    buf.extend_from_slice(mime);
    buf.extend_from_slice(&payload.bytes);
    buf
}

/// Decode a framed buffer back into a payload.
pub fn decode(buf: &[u8]) -> Result<Payload, CodecError> {
    if buf.len() < HEADER_LEN {
        return Err(CodecError::Truncated);
    }

    let version = buf[0];
    if version != FRAME_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }

    let mime_len = u16::from_be_bytes([buf[1], buf[2]]) as usize;
    let body_start = HEADER_LEN + mime_len;
    if buf.len() < body_start {
        return Err(CodecError::MimeOverrun);
    }

    let content_type = std::str::from_utf8(&buf[HEADER_LEN..body_start])
        .map_err(|_| CodecError::MimeEncoding)?
        .to_string();

    let bytes = buf[body_start..].to_vec();
    if bytes.is_empty() {
        return Err(CodecError::EmptyBody);
    }

    Ok(Payload {
        content_type,
        bytes,
    })
}
