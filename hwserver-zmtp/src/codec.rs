use bytes::{BufMut, Bytes, BytesMut};
use hwserver_core::buffer::SegmentedBuffer;
use hwserver_core::error::HwError;
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::socket_type::SocketType;

/// ZMTP frame flags
pub const FLAG_MORE: u8 = 0x01;
pub const FLAG_LONG: u8 = 0x02;
pub const FLAG_COMMAND: u8 = 0x04;
const FLAG_RESERVED: u8 = 0xF8;

/// ZMTP protocol errors
#[derive(Debug, Error)]
pub enum ZmtpError {
    #[error("Protocol violation: reserved bits set")]
    ReservedBits,

    #[error("Protocol violation: frame size too large")]
    SizeTooLarge,

    #[error("Frame of {size} bytes exceeds limit of {max}")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Message of {size} bytes exceeds limit of {max}")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Invalid greeting: {0}")]
    InvalidGreeting(&'static str),

    #[error("Unsupported security mechanism: {0}")]
    UnsupportedMechanism(String),

    #[error("Incompatible peer: {local} cannot talk to {peer}")]
    IncompatiblePeer { local: SocketType, peer: SocketType },

    #[error("Peer rejected handshake: {0}")]
    PeerError(String),

    #[error("Handshake timeout after {0:?}")]
    HandshakeTimeout(Duration),

    #[error("Protocol violation: {0}")]
    Protocol(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for ZMTP operations
pub type Result<T> = std::result::Result<T, ZmtpError>;

impl From<ZmtpError> for io::Error {
    fn from(err: ZmtpError) -> Self {
        match err {
            ZmtpError::Io(e) => e,
            ZmtpError::HandshakeTimeout(_) => io::Error::new(io::ErrorKind::TimedOut, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

impl From<ZmtpError> for HwError {
    fn from(err: ZmtpError) -> Self {
        match err {
            ZmtpError::Io(e) => HwError::Io(e),
            ZmtpError::HandshakeTimeout(d) => HwError::HandshakeTimeout(d),
            ZmtpError::InvalidGreeting(msg) => HwError::InvalidGreeting(msg.to_string()),
            ZmtpError::FrameTooLarge { size, max } | ZmtpError::MessageTooLarge { size, max } => {
                HwError::MessageTooLarge { size, max }
            }
            ZmtpError::ReservedBits | ZmtpError::SizeTooLarge => {
                HwError::invalid_frame(err.to_string())
            }
            other => HwError::protocol(other.to_string()),
        }
    }
}

/// Classify an error returned by a socket call.
///
/// Socket APIs return `io::Error`; protocol failures travel inside it as a
/// `ZmtpError` and are unwrapped here so callers see the specific variant.
pub fn session_error(err: io::Error) -> HwError {
    if !err.get_ref().is_some_and(|inner| inner.is::<ZmtpError>()) {
        return HwError::Io(err);
    }
    match err.into_inner().map(|inner| inner.downcast::<ZmtpError>()) {
        Some(Ok(zmtp)) => HwError::from(*zmtp),
        _ => HwError::protocol("unrecognized protocol error"),
    }
}

/// A decoded ZMTP frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZmtpFrame {
    pub flags: u8,
    pub payload: Bytes,
}

impl ZmtpFrame {
    #[inline]
    pub const fn more(&self) -> bool {
        (self.flags & FLAG_MORE) != 0
    }

    #[inline]
    pub const fn is_command(&self) -> bool {
        (self.flags & FLAG_COMMAND) != 0
    }
}

/// Stateful ZMTP frame decoder.
///
/// The header is parsed once and remembered, so a body that arrives over
/// several reads is only pulled out of the buffer when it is complete.
#[derive(Debug, Default)]
pub struct ZmtpDecoder {
    /// Flags and body length of a frame whose body is still incomplete
    pending: Option<(u8, usize)>,
    max_frame_size: Option<usize>,
}

impl ZmtpDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: None,
            max_frame_size: None,
        }
    }

    /// Reject frames whose body exceeds `max` bytes before buffering them.
    #[must_use]
    pub const fn with_max_frame_size(max: Option<usize>) -> Self {
        Self {
            pending: None,
            max_frame_size: max,
        }
    }

    /// Whether a frame header has been consumed but its body has not.
    #[inline]
    pub const fn is_mid_frame(&self) -> bool {
        self.pending.is_some()
    }

    /// Decode a single frame from `src`
    ///
    /// Returns:
    /// - Ok(Some(frame)) → frame decoded
    /// - Ok(None) → need more data
    /// - Err → protocol violation
    pub fn decode(&mut self, src: &mut SegmentedBuffer) -> Result<Option<ZmtpFrame>> {
        let (flags, body_len) = match self.pending {
            Some(header) => header,
            None => {
                let mut hdr = [0u8; 9];
                if !src.peek(&mut hdr[..1]) {
                    return Ok(None);
                }

                let flags = hdr[0];
                if (flags & FLAG_RESERVED) != 0 {
                    return Err(ZmtpError::ReservedBits);
                }

                let is_long = (flags & FLAG_LONG) != 0;
                let header_len = if is_long { 9 } else { 2 };
                if !src.peek(&mut hdr[..header_len]) {
                    return Ok(None);
                }

                let body_len = if is_long {
                    let mut size = [0u8; 8];
                    size.copy_from_slice(&hdr[1..9]);
                    let size = u64::from_be_bytes(size);
                    // MSB must be zero in ZMTP 3.x
                    if size > 0x7FFF_FFFF_FFFF_FFFF {
                        return Err(ZmtpError::SizeTooLarge);
                    }
                    usize::try_from(size).map_err(|_| ZmtpError::SizeTooLarge)?
                } else {
                    hdr[1] as usize
                };

                if let Some(max) = self.max_frame_size {
                    if body_len > max {
                        return Err(ZmtpError::FrameTooLarge {
                            size: body_len,
                            max,
                        });
                    }
                }

                src.skip(header_len);
                self.pending = Some((flags, body_len));
                (flags, body_len)
            }
        };

        match src.split_front(body_len) {
            Some(payload) => {
                self.pending = None;
                Ok(Some(ZmtpFrame { flags, payload }))
            }
            None => Ok(None),
        }
    }
}

#[inline]
fn put_header(dst: &mut BytesMut, flags: u8, body_len: usize) {
    if body_len <= 255 {
        dst.put_u8(flags & !FLAG_LONG);
        dst.put_u8(body_len as u8);
    } else {
        dst.put_u8(flags | FLAG_LONG);
        dst.put_u64(body_len as u64);
    }
}

/// Append a single frame (header + body) to `dst`.
pub fn encode_frame(flags: u8, body: &[u8], dst: &mut BytesMut) {
    dst.reserve(9 + body.len());
    put_header(dst, flags, body.len());
    dst.extend_from_slice(body);
}

/// Append a command frame to `dst`.
pub fn encode_command(body: &[u8], dst: &mut BytesMut) {
    encode_frame(FLAG_COMMAND, body, dst);
}

/// Append a multipart data message to `dst`.
///
/// Every frame but the last carries MORE.
pub fn encode_multipart<'a, I>(frames: I, dst: &mut BytesMut)
where
    I: IntoIterator<Item = &'a Bytes>,
{
    let mut frames = frames.into_iter().peekable();
    while let Some(frame) = frames.next() {
        let flags = if frames.peek().is_some() { FLAG_MORE } else { 0 };
        encode_frame(flags, frame, dst);
    }
}
