use crate::codec::{ZmtpError, ZmtpFrame};
use crate::command::{build_ready, parse_command, parse_ready};
use crate::mechanism::{require_command, Mechanism};
use crate::socket_type::SocketType;
use bytes::Bytes;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NullState {
    /// Our READY is queued; waiting for the peer's.
    NeedRecvReady,
    Done,
}

/// ZMTP/NULL: each side sends READY once and accepts one READY.
pub struct NullMechanism {
    state: NullState,
    pending_out: Option<Bytes>,
    peer_socket_type: Option<SocketType>,
    peer_identity: Option<Bytes>,
}

impl NullMechanism {
    pub fn new(local_socket_type: SocketType, identity: Option<&[u8]>) -> Self {
        // READY goes out eagerly on both sides.
        Self {
            state: NullState::NeedRecvReady,
            pending_out: Some(build_ready(local_socket_type, identity)),
            peer_socket_type: None,
            peer_identity: None,
        }
    }
}

impl Mechanism for NullMechanism {
    fn next_outbound(&mut self) -> Option<Bytes> {
        self.pending_out.take()
    }

    fn on_inbound(&mut self, frame: &ZmtpFrame) -> Result<(), ZmtpError> {
        require_command(frame)?;

        if self.state != NullState::NeedRecvReady {
            return Err(ZmtpError::Protocol("handshake command after READY"));
        }

        let cmd = parse_command(&frame.payload)?;
        if cmd.is(b"ERROR") {
            return Err(ZmtpError::PeerError(cmd.error_reason()));
        }

        let meta = parse_ready(&cmd)?;
        debug!(peer_socket_type = %meta.socket_type, "[NULL] Peer READY accepted");
        self.peer_socket_type = Some(meta.socket_type);
        self.peer_identity = meta.identity;
        self.state = NullState::Done;
        Ok(())
    }

    fn is_done(&self) -> bool {
        self.state == NullState::Done
    }

    fn peer_socket_type(&self) -> Option<SocketType> {
        self.peer_socket_type
    }

    fn peer_identity(&self) -> Option<Bytes> {
        self.peer_identity.clone()
    }
}
