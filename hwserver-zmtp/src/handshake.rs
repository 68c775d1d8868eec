//! ZMTP handshake that completes before the socket is handed to the caller.
//!
//! Sequence (both sides run it symmetrically):
//! 1. send our 64-byte greeting, read the peer's
//! 2. let the negotiated mechanism exchange command frames (NULL: READY)
//! 3. check the peer's socket type against ours
//!
//! Frames are read with exact-size reads so no application data sent right
//! after the peer's READY is consumed here.

use crate::codec::{encode_command, ZmtpError, ZmtpFrame, FLAG_COMMAND, FLAG_LONG};
use crate::greeting::{build_greeting, ZmtpGreeting, GREETING_SIZE};
use crate::mechanism;
use crate::socket_type::SocketType;
use bytes::{Bytes, BytesMut};
use compio::buf::BufResult;
use compio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use hwserver_core::iobuf::IoBytes;
use std::time::Duration;
use tracing::debug;

/// Generous bound for a READY body (socket type, identity, a few extra props).
const MAX_HANDSHAKE_COMMAND: usize = 4096;

/// Result of a successful handshake
#[derive(Debug, Clone)]
pub struct HandshakeResult {
    pub peer_identity: Option<Bytes>,
    pub peer_socket_type: SocketType,
    /// ZMTP (major, minor) the peer announced
    pub peer_version: (u8, u8),
}

/// Run the full handshake, bounded by `timeout` when set.
pub async fn perform_handshake<S>(
    stream: &mut S,
    local_socket_type: SocketType,
    identity: Option<&[u8]>,
    timeout: Option<Duration>,
) -> Result<HandshakeResult, ZmtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let fut = exchange(stream, local_socket_type, identity);
    match timeout {
        None => fut.await,
        Some(d) => compio::time::timeout(d, fut)
            .await
            .map_err(|_| ZmtpError::HandshakeTimeout(d))?,
    }
}

async fn exchange<S>(
    stream: &mut S,
    local_socket_type: SocketType,
    identity: Option<&[u8]>,
) -> Result<HandshakeResult, ZmtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    debug!("[HANDSHAKE] Starting handshake as {}", local_socket_type);

    let BufResult(res, _) = stream.write_all(IoBytes::new(build_greeting())).await;
    res?;

    let buf = [0u8; GREETING_SIZE];
    let BufResult(res, buf) = stream.read_exact(buf).await;
    res?;
    let greeting = ZmtpGreeting::parse(&buf)?;
    debug!(
        major = greeting.major,
        minor = greeting.minor,
        mechanism = greeting.mechanism.as_str(),
        as_server = greeting.as_server,
        "[HANDSHAKE] Received peer greeting"
    );

    let mut mech = mechanism::select(&greeting.mechanism, local_socket_type, identity)?;
    loop {
        if let Some(body) = mech.next_outbound() {
            let mut out = BytesMut::with_capacity(body.len() + 9);
            encode_command(&body, &mut out);
            let BufResult(res, _) = stream.write_all(IoBytes::new(out.freeze())).await;
            res?;
        }
        if mech.is_done() {
            break;
        }
        let frame = read_command_frame(stream).await?;
        mech.on_inbound(&frame)?;
    }

    let peer_socket_type = mech
        .peer_socket_type()
        .ok_or(ZmtpError::Protocol("mechanism finished without peer socket type"))?;
    if !local_socket_type.is_compatible_with(peer_socket_type) {
        return Err(ZmtpError::IncompatiblePeer {
            local: local_socket_type,
            peer: peer_socket_type,
        });
    }

    debug!("[HANDSHAKE] Handshake complete, peer is {}", peer_socket_type);

    Ok(HandshakeResult {
        peer_identity: mech.peer_identity(),
        peer_socket_type,
        peer_version: (greeting.major, greeting.minor),
    })
}

/// Read exactly one command frame.
async fn read_command_frame<S>(stream: &mut S) -> Result<ZmtpFrame, ZmtpError>
where
    S: AsyncRead + Unpin,
{
    let header = [0u8; 2];
    let BufResult(res, header) = stream.read_exact(header).await;
    res?;

    let flags = header[0];
    if (flags & FLAG_COMMAND) == 0 {
        return Err(ZmtpError::Protocol("data frame during handshake"));
    }

    let body_len = if (flags & FLAG_LONG) != 0 {
        // The second header byte is the first of eight size bytes
        let rest = [0u8; 7];
        let BufResult(res, rest) = stream.read_exact(rest).await;
        res?;
        let mut size = [0u8; 8];
        size[0] = header[1];
        size[1..].copy_from_slice(&rest);
        usize::try_from(u64::from_be_bytes(size)).map_err(|_| ZmtpError::SizeTooLarge)?
    } else {
        header[1] as usize
    };

    if body_len > MAX_HANDSHAKE_COMMAND {
        return Err(ZmtpError::FrameTooLarge {
            size: body_len,
            max: MAX_HANDSHAKE_COMMAND,
        });
    }

    let payload = if body_len == 0 {
        Bytes::new()
    } else {
        let body = vec![0u8; body_len];
        let BufResult(res, body) = stream.read_exact(body).await;
        res?;
        Bytes::from(body)
    };

    Ok(ZmtpFrame { flags, payload })
}
