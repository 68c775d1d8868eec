//! Socket configuration options
//!
//! The subset of libzmq socket options (zmq_setsockopt/zmq_getsockopt) that
//! a request/reply peer needs.

use std::time::Duration;

/// Default handshake timeout (ZMQ_HANDSHAKE_IVL default in libzmq).
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Read buffer size sized for REQ/REP ping-pong with small messages.
pub const DEFAULT_READ_BUF_SIZE: usize = 4096;

/// Initial write buffer capacity.
pub const DEFAULT_WRITE_BUF_SIZE: usize = 4096;

/// Socket configuration options.
///
/// # Examples
///
/// ```
/// use hwserver_core::options::SocketOptions;
/// use std::time::Duration;
///
/// let opts = SocketOptions::default()
///     .with_recv_timeout(Duration::from_secs(5))
///     .with_max_msg_size(1024);
/// assert_eq!(opts.max_msg_size, Some(1024));
/// ```
#[derive(Debug, Clone)]
pub struct SocketOptions {
    /// Receive timeout (ZMQ_RCVTIMEO)
    ///
    /// - `None`: Block indefinitely (default)
    /// - `Some(Duration::ZERO)`: Non-blocking, fail with `WouldBlock`
    /// - `Some(duration)`: Fail with `TimedOut` after duration
    pub recv_timeout: Option<Duration>,

    /// Send timeout (ZMQ_SNDTIMEO), same semantics as `recv_timeout`.
    pub send_timeout: Option<Duration>,

    /// Handshake timeout (ZMQ_HANDSHAKE_IVL)
    ///
    /// Maximum time for greeting + READY exchange. `Duration::ZERO` disables it.
    pub handshake_timeout: Duration,

    /// Maximum message size (ZMQ_MAXMSGSIZE)
    ///
    /// - `None`: No limit (default)
    /// - `Some(size)`: Reject inbound messages whose body exceeds size
    pub max_msg_size: Option<usize>,

    /// Bytes requested per socket read.
    pub read_buffer_size: usize,

    /// Initial capacity of the encode buffer.
    pub write_buffer_size: usize,

    /// Disable Nagle's algorithm on TCP streams.
    pub tcp_nodelay: bool,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            recv_timeout: None,
            send_timeout: None,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            max_msg_size: None,
            read_buffer_size: DEFAULT_READ_BUF_SIZE,
            write_buffer_size: DEFAULT_WRITE_BUF_SIZE,
            tcp_nodelay: true,
        }
    }
}

impl SocketOptions {
    #[must_use]
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_msg_size(mut self, size: usize) -> Self {
        self.max_msg_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    #[must_use]
    pub fn with_tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }

    /// Handshake timeout as an optional bound (`None` when disabled).
    #[must_use]
    pub fn handshake_deadline(&self) -> Option<Duration> {
        if self.handshake_timeout.is_zero() {
            None
        } else {
            Some(self.handshake_timeout)
        }
    }
}
