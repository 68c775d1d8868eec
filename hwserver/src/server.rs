//! The hello world request/reply loop.
//!
//! One peer is served at a time: the server accepts a connection, speaks
//! REP on it until the peer hangs up, then accepts the next one. Every
//! request is answered with the configured reply after the configured work
//! delay.

use bytes::Bytes;
use compio::net::{TcpListener, TcpStream};
use hwserver_core::error::HwError;
use hwserver_zmtp::codec::session_error;
use hwserver_zmtp::RepSocket;
use std::borrow::Cow;
use std::net::SocketAddr;
use tracing::{debug, info, warn};

use crate::config::Config;

/// REP server bound to a TCP listener.
pub struct HelloServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: Config,
    reply: Bytes,
    served: u64,
}

impl HelloServer {
    /// Bind the listener described by `config.bind`.
    ///
    /// # Errors
    ///
    /// `HwError::Config` if `config` does not validate, otherwise an I/O
    /// error if the address cannot be bound.
    pub async fn bind(config: Config) -> Result<Self, HwError> {
        config
            .validate()
            .map_err(|e| HwError::config(e.to_string()))?;
        let listener = TcpListener::bind(config.bind.socket_addr()).await?;
        let local_addr = listener.local_addr()?;

        info!(
            endpoint = %config.bind,
            %local_addr,
            work_ms = config.work.as_millis() as u64,
            max_requests = ?config.max_requests,
            "Listening for requests"
        );

        Ok(Self {
            listener,
            local_addr,
            reply: Bytes::from(config.reply.clone().into_bytes()),
            config,
            served: 0,
        })
    }

    /// Address actually bound; resolves port 0 to the assigned port.
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve peers until `max_requests` replies have been sent.
    ///
    /// Without a limit this only returns on a listener failure. A peer whose
    /// session fails is logged and dropped; the next peer is then accepted.
    ///
    /// # Errors
    ///
    /// Returns the error if accepting a connection fails.
    pub async fn run(&mut self) -> Result<u64, HwError> {
        while !self.is_done() {
            let (stream, peer) = self.listener.accept().await?;
            debug!(%peer, "Accepted connection");

            match self.serve_peer(stream).await {
                Ok(()) => debug!(%peer, "Peer disconnected"),
                Err(e) if e.is_connection_error() => {
                    warn!(%peer, error = %e, "Peer session failed");
                }
                Err(e) => return Err(e),
            }
        }

        info!(served = self.served, "Request limit reached, stopping");
        Ok(self.served)
    }

    fn is_done(&self) -> bool {
        self.config
            .max_requests
            .map_or(false, |max| self.served >= max)
    }

    /// Answer requests from one peer until it disconnects.
    async fn serve_peer(&mut self, stream: TcpStream) -> Result<(), HwError> {
        let mut socket = RepSocket::from_tcp_with_options(stream, self.config.socket_options())
            .await
            .map_err(session_error)?;
        debug!(peer_socket_type = %socket.peer_socket_type(), "Peer ready");

        while !self.is_done() {
            let Some(request) = socket.recv().await.map_err(session_error)? else {
                return Ok(());
            };
            info!(request = %preview(&request), "Received Hello");

            // Do some 'work'
            if !self.config.work.is_zero() {
                compio::time::sleep(self.config.work).await;
            }

            socket
                .send(vec![self.reply.clone()])
                .await
                .map_err(session_error)?;
            self.served += 1;
        }
        Ok(())
    }
}

/// Render request frames for the log line.
fn preview(frames: &[Bytes]) -> Cow<'_, str> {
    match frames {
        [single] => String::from_utf8_lossy(single),
        _ => Cow::Owned(
            frames
                .iter()
                .map(|f| String::from_utf8_lossy(f))
                .collect::<Vec<_>>()
                .join(" | "),
        ),
    }
}
