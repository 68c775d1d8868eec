//! Socket infrastructure shared by the REQ and REP sockets.
//!
//! `SocketBase<S>` owns the stream, the receive buffer and frame decoder,
//! and the encode buffer. Socket types compose it and add their own state
//! machine on top.

use bytes::{Bytes, BytesMut};
use compio::buf::BufResult;
use compio::io::{AsyncRead, AsyncWrite};
use compio::net::TcpStream;
use hwserver_core::buffer::SegmentedBuffer;
use hwserver_core::iobuf::IoBytes;
use hwserver_core::options::SocketOptions;
use hwserver_core::poison::PoisonGuard;
use hwserver_core::timeout::{read_with_timeout, write_all_with_timeout};
use std::fmt;
use std::io;
use tracing::{debug, trace};

use crate::codec::{encode_command, ZmtpDecoder, ZmtpFrame};
use crate::command::{build_pong, parse_command};
use crate::handshake::{perform_handshake, HandshakeResult};
use crate::socket_type::SocketType;

fn poisoned() -> io::Error {
    io::Error::new(
        io::ErrorKind::BrokenPipe,
        "Socket poisoned by cancelled I/O - peer session must be dropped",
    )
}

pub struct SocketBase<S = TcpStream>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) stream: S,
    pub(crate) decoder: ZmtpDecoder,
    pub(crate) recv: SegmentedBuffer,
    /// Reusable encode buffer for outgoing frames
    pub(crate) write_buf: BytesMut,
    pub(crate) options: SocketOptions,
    pub(crate) peer: HandshakeResult,
    /// Set while a read or write is in flight; stays set if it is cancelled
    pub(crate) is_poisoned: bool,
}

impl<S> SocketBase<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Handshake as `socket_type` and wrap the stream.
    pub(crate) async fn establish(
        mut stream: S,
        socket_type: SocketType,
        options: SocketOptions,
    ) -> io::Result<Self> {
        let peer = perform_handshake(
            &mut stream,
            socket_type,
            None,
            options.handshake_deadline(),
        )
        .await?;

        Ok(Self {
            stream,
            decoder: ZmtpDecoder::with_max_frame_size(options.max_msg_size),
            recv: SegmentedBuffer::new(),
            write_buf: BytesMut::with_capacity(options.write_buffer_size),
            options,
            peer,
            is_poisoned: false,
        })
    }

    /// Read once from the stream into the receive buffer.
    ///
    /// Returns `Ok(0)` on EOF.
    pub(crate) async fn read_raw(&mut self) -> io::Result<usize> {
        if self.is_poisoned {
            return Err(poisoned());
        }

        let guard = PoisonGuard::new(&mut self.is_poisoned);
        let buf = Vec::with_capacity(self.options.read_buffer_size);
        let BufResult(result, mut buf) =
            read_with_timeout(&mut self.stream, buf, self.options.recv_timeout).await?;
        let n = result?;
        guard.disarm();

        if n == 0 {
            trace!("[SocketBase] Connection closed (EOF)");
            return Ok(0);
        }

        buf.truncate(n);
        self.recv.push(Bytes::from(buf));
        Ok(n)
    }

    /// Read the next complete frame; `Ok(None)` on EOF.
    pub(crate) async fn read_frame(&mut self) -> io::Result<Option<ZmtpFrame>> {
        loop {
            if let Some(frame) = self.decoder.decode(&mut self.recv)? {
                return Ok(Some(frame));
            }

            if self.read_raw().await? == 0 {
                if self.decoder.is_mid_frame() || !self.recv.is_empty() {
                    debug!(
                        buffered = self.recv.len(),
                        "[SocketBase] Peer closed mid-frame, discarding partial data"
                    );
                }
                return Ok(None);
            }
        }
    }

    /// Write the contents of `write_buf` to the stream.
    pub(crate) async fn write_from_buf(&mut self) -> io::Result<()> {
        if self.is_poisoned {
            return Err(poisoned());
        }

        let guard = PoisonGuard::new(&mut self.is_poisoned);
        let buf = self.write_buf.split().freeze();
        let BufResult(result, _) =
            write_all_with_timeout(&mut self.stream, IoBytes::new(buf), self.options.send_timeout)
                .await?;
        result?;
        guard.disarm();
        Ok(())
    }

    /// Handle a command frame received after the handshake.
    ///
    /// PING is answered with PONG; anything else is ignored.
    pub(crate) async fn on_command(&mut self, frame: &ZmtpFrame) -> io::Result<()> {
        let cmd = parse_command(&frame.payload)?;
        if cmd.is(b"PING") {
            let context = cmd.ping_context()?;
            trace!(context_len = context.len(), "[SocketBase] PING -> PONG");
            let pong = build_pong(context);
            self.write_buf.clear();
            encode_command(&pong, &mut self.write_buf);
            self.write_from_buf().await
        } else {
            trace!(command = ?cmd.name_str(), "[SocketBase] Ignoring command");
            Ok(())
        }
    }

    #[inline]
    pub const fn peer_socket_type(&self) -> SocketType {
        self.peer.peer_socket_type
    }

    #[inline]
    pub fn peer_identity(&self) -> Option<&Bytes> {
        self.peer.peer_identity.as_ref()
    }
}

impl<S> fmt::Debug for SocketBase<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketBase")
            .field("peer_socket_type", &self.peer.peer_socket_type)
            .field("poisoned", &self.is_poisoned)
            .field("buffered_bytes", &self.recv.len())
            .finish()
    }
}
