//! Direct-stream REQ socket.
//!
//! ```text
//! Idle → send() → AwaitingReply → recv() → Idle
//! ```
//!
//! Requests go out as `[empty delimiter, body...]`; replies must start with
//! the delimiter, which `recv()` strips. Replies without it are dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! use hwserver_core::endpoint::Endpoint;
//! use hwserver_core::options::SocketOptions;
//! use hwserver_zmtp::ReqSocket;
//! use bytes::Bytes;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let endpoint = Endpoint::parse("tcp://localhost:5560")?;
//! let mut socket = ReqSocket::connect(&endpoint, SocketOptions::default()).await?;
//!
//! socket.send(vec![Bytes::from_static(b"Hello")]).await?;
//! let reply = socket.recv().await?;
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use compio::io::{AsyncRead, AsyncWrite};
use compio::net::TcpStream;
use hwserver_core::endpoint::Endpoint;
use hwserver_core::options::SocketOptions;
use smallvec::SmallVec;
use std::io;
use tracing::{debug, trace, warn};

use crate::base::SocketBase;
use crate::codec::encode_multipart;
use crate::socket_type::SocketType;

/// REQ socket state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReqState {
    /// Ready to send a request
    Idle,
    /// Waiting for a reply after sending request
    AwaitingReply,
}

pub struct ReqSocket<S = TcpStream>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    base: SocketBase<S>,
    /// Frames of the message being assembled
    frames: SmallVec<[Bytes; 4]>,
    state: ReqState,
}

impl<S> ReqSocket<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub async fn new(stream: S) -> io::Result<Self> {
        Self::with_options(stream, SocketOptions::default()).await
    }

    pub async fn with_options(stream: S, options: SocketOptions) -> io::Result<Self> {
        let base = SocketBase::establish(stream, SocketType::Req, options).await?;
        debug!(
            peer_socket_type = %base.peer_socket_type(),
            peer_version = ?base.peer.peer_version,
            "[REQ] Handshake complete"
        );
        Ok(Self {
            base,
            frames: SmallVec::new(),
            state: ReqState::Idle,
        })
    }

    /// Send a request.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the previous reply has not been received yet.
    pub async fn send(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        if self.state != ReqState::Idle {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Cannot send while awaiting reply - must call recv() first",
            ));
        }

        trace!("[REQ] Sending {} frames", msg.len());

        let delimiter = Bytes::new();
        self.base.write_buf.clear();
        encode_multipart(
            std::iter::once(&delimiter).chain(msg.iter()),
            &mut self.base.write_buf,
        );
        self.base.write_from_buf().await?;

        self.state = ReqState::AwaitingReply;
        Ok(())
    }

    /// Receive the reply to the last request.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(reply))` - reply frames with the delimiter removed
    /// - `Ok(None)` - peer closed the connection
    ///
    /// # Errors
    ///
    /// `InvalidInput` if called while Idle (no request sent).
    pub async fn recv(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        if self.state != ReqState::AwaitingReply {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Cannot recv in Idle state - must call send() first",
            ));
        }

        loop {
            let Some(frame) = self.base.read_frame().await? else {
                self.frames.clear();
                return Ok(None);
            };

            if frame.is_command() {
                self.base.on_command(&frame).await?;
                continue;
            }

            let more = frame.more();
            self.frames.push(frame.payload);
            if more {
                continue;
            }

            if self.frames.first().map_or(true, |f| !f.is_empty()) {
                warn!("[REQ] Dropping reply without envelope delimiter");
                self.frames.clear();
                continue;
            }

            let reply: Vec<Bytes> = self.frames.drain(1..).collect();
            self.frames.clear();
            self.state = ReqState::Idle;
            return Ok(Some(reply));
        }
    }

    pub const fn state(&self) -> ReqState {
        self.state
    }

    pub const fn peer_socket_type(&self) -> SocketType {
        self.base.peer_socket_type()
    }
}

impl ReqSocket<TcpStream> {
    /// Connect to `endpoint` and perform the handshake.
    pub async fn connect(endpoint: &Endpoint, options: SocketOptions) -> io::Result<Self> {
        let stream = TcpStream::connect(endpoint.socket_addr()).await?;
        if options.tcp_nodelay {
            hwserver_core::tcp::enable_tcp_nodelay(&stream)?;
        }
        debug!(%endpoint, "[REQ] Connected");
        Self::with_options(stream, options).await
    }
}
