pub mod null;

use bytes::Bytes;

use crate::codec::{ZmtpError, ZmtpFrame};
use crate::greeting::MechanismName;
use crate::socket_type::SocketType;

/// Security mechanism state machine run after the greeting exchange.
///
/// The mechanism:
/// - emits outbound command bodies (READY, ERROR, ...)
/// - validates inbound command frames
/// - reports peer metadata once done
pub trait Mechanism: Send {
    /// Next command body to send, if any.
    fn next_outbound(&mut self) -> Option<Bytes>;

    /// Feed an inbound handshake frame.
    fn on_inbound(&mut self, frame: &ZmtpFrame) -> Result<(), ZmtpError>;

    /// Whether the handshake is finished.
    fn is_done(&self) -> bool;

    /// Peer socket type from READY.
    fn peer_socket_type(&self) -> Option<SocketType>;

    /// Peer identity from READY, owned.
    fn peer_identity(&self) -> Option<Bytes>;
}

/// Pick the mechanism both greetings agreed on.
///
/// Only NULL is implemented; a peer asking for anything else is refused.
pub fn select(
    peer: &MechanismName,
    local_socket_type: SocketType,
    identity: Option<&[u8]>,
) -> Result<Box<dyn Mechanism>, ZmtpError> {
    match peer {
        MechanismName::Null => Ok(Box::new(null::NullMechanism::new(
            local_socket_type,
            identity,
        ))),
        other => Err(ZmtpError::UnsupportedMechanism(other.as_str().to_string())),
    }
}

/// During the handshake any data frame is a violation.
#[inline]
pub fn require_command(frame: &ZmtpFrame) -> Result<(), ZmtpError> {
    if frame.is_command() {
        Ok(())
    } else {
        Err(ZmtpError::Protocol("data frame during handshake"))
    }
}
