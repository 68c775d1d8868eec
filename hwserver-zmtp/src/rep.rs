//! Direct-stream REP socket
//!
//! # REP State Machine
//!
//! - Start in `AwaitingRequest`
//! - `recv()` moves to `ReadyToReply`
//! - `send()` moves back to `AwaitingRequest`
//!
//! Calling either out of turn returns `InvalidInput`.
//!
//! # Envelopes
//!
//! A request is `[envelope..., empty delimiter, body...]`. A REQ peer sends
//! an envelope of just the delimiter; a DEALER peer may prepend its own
//! routing frames. The envelope is stripped from what `recv()` returns and
//! written back in front of the reply. Requests without a delimiter are
//! malformed and dropped, as libzmq does.

use bytes::Bytes;
use compio::io::{AsyncRead, AsyncWrite};
use compio::net::TcpStream;
use hwserver_core::options::SocketOptions;
use smallvec::SmallVec;
use std::io;
use tracing::{debug, trace, warn};

use crate::base::SocketBase;
use crate::codec::{encode_multipart, ZmtpError};
use crate::socket_type::SocketType;

/// REP socket state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepState {
    /// Awaiting a request from the client
    AwaitingRequest,
    /// Received a request, ready to send reply
    ReadyToReply,
}

/// REP socket over a single connected stream.
///
/// # Example
///
/// ```rust,no_run
/// use hwserver_zmtp::RepSocket;
/// use bytes::Bytes;
/// use compio::net::TcpListener;
///
/// # async fn example() -> std::io::Result<()> {
/// let listener = TcpListener::bind("127.0.0.1:5560").await?;
/// let (stream, _) = listener.accept().await?;
/// let mut socket = RepSocket::from_tcp(stream).await?;
///
/// while let Some(_request) = socket.recv().await? {
///     socket.send(vec![Bytes::from_static(b"World")]).await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct RepSocket<S = TcpStream>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    base: SocketBase<S>,
    /// Frames of the message being assembled
    frames: SmallVec<[Bytes; 4]>,
    /// Routing envelope of the request being answered, delimiter included
    envelope: SmallVec<[Bytes; 2]>,
    state: RepState,
}

impl<S> RepSocket<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Perform the ZMTP handshake and wrap the stream.
    ///
    /// # Errors
    ///
    /// Fails if the handshake fails, times out, or the peer is not a REQ or
    /// DEALER socket.
    pub async fn new(stream: S) -> io::Result<Self> {
        Self::with_options(stream, SocketOptions::default()).await
    }

    pub async fn with_options(stream: S, options: SocketOptions) -> io::Result<Self> {
        debug!("[REP] Performing ZMTP handshake...");
        let base = SocketBase::establish(stream, SocketType::Rep, options).await?;

        debug!(
            peer_identity = ?base.peer_identity(),
            peer_socket_type = %base.peer_socket_type(),
            peer_version = ?base.peer.peer_version,
            "[REP] Handshake complete"
        );

        Ok(Self {
            base,
            frames: SmallVec::new(),
            envelope: SmallVec::new(),
            state: RepState::AwaitingRequest,
        })
    }

    /// Receive a request body.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(body))` - request frames with the envelope removed
    /// - `Ok(None)` - peer closed the connection
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if a reply is still owed
    /// - `InvalidData` on protocol violations, or as soon as the request body
    ///   grows past `max_msg_size` (before the final frame arrives)
    pub async fn recv(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        if self.state != RepState::AwaitingRequest {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Cannot recv while in ReadyToReply state - must call send() first",
            ));
        }

        trace!("[REP] Waiting for request");

        // Bytes that would count as body: everything after the delimiter, or
        // everything so far if it has not arrived yet
        let max = self.base.options.max_msg_size;
        let mut body_size = 0usize;
        let mut delimited = false;

        loop {
            let Some(frame) = self.base.read_frame().await? else {
                trace!("[REP] Connection closed");
                self.frames.clear();
                return Ok(None);
            };

            if frame.is_command() {
                self.base.on_command(&frame).await?;
                continue;
            }

            if !delimited && frame.payload.is_empty() {
                delimited = true;
                body_size = 0;
            } else {
                body_size += frame.payload.len();
                if let Some(max) = max.filter(|&max| body_size > max) {
                    self.frames.clear();
                    self.envelope.clear();
                    return Err(ZmtpError::MessageTooLarge {
                        size: body_size,
                        max,
                    }
                    .into());
                }
            }

            let more = frame.more();
            self.frames.push(frame.payload);
            if more {
                continue;
            }

            // Complete message: split at the first empty delimiter
            let Some(delimiter) = self.frames.iter().position(|f| f.is_empty()) else {
                warn!(
                    frames = self.frames.len(),
                    "[REP] Dropping request without envelope delimiter"
                );
                self.frames.clear();
                body_size = 0;
                continue;
            };

            let body: Vec<Bytes> = self.frames.drain(delimiter + 1..).collect();
            self.envelope.clear();
            self.envelope.extend(self.frames.drain(..));

            trace!(
                frames = body.len(),
                envelope = self.envelope.len(),
                "[REP] Received request"
            );
            self.state = RepState::ReadyToReply;
            return Ok(Some(body));
        }
    }

    /// Send the reply to the last request.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if no request is pending or `msg` is empty
    /// - I/O errors from the write
    pub async fn send(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        if self.state != RepState::ReadyToReply {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Cannot send while awaiting request - must call recv() first",
            ));
        }
        if msg.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Reply must contain at least one frame",
            ));
        }

        trace!("[REP] Sending {} frames", msg.len());

        self.base.write_buf.clear();
        encode_multipart(self.envelope.iter().chain(msg.iter()), &mut self.base.write_buf);
        self.base.write_from_buf().await?;

        self.envelope.clear();
        self.state = RepState::AwaitingRequest;
        Ok(())
    }

    /// Current state of the REP state machine.
    pub const fn state(&self) -> RepState {
        self.state
    }

    /// Socket type of the connected peer.
    pub const fn peer_socket_type(&self) -> SocketType {
        self.base.peer_socket_type()
    }

    pub const fn options(&self) -> &SocketOptions {
        &self.base.options
    }

    #[inline]
    pub fn socket_type(&self) -> SocketType {
        SocketType::Rep
    }
}

impl RepSocket<TcpStream> {
    /// Create a REP socket from an accepted TCP stream with TCP_NODELAY.
    pub async fn from_tcp(stream: TcpStream) -> io::Result<Self> {
        Self::from_tcp_with_options(stream, SocketOptions::default()).await
    }

    pub async fn from_tcp_with_options(
        stream: TcpStream,
        options: SocketOptions,
    ) -> io::Result<Self> {
        if options.tcp_nodelay {
            hwserver_core::tcp::enable_tcp_nodelay(&stream)?;
            debug!("[REP] TCP_NODELAY enabled");
        }
        Self::with_options(stream, options).await
    }
}
