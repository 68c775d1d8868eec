//! TCP tuning for request/reply latency.
//!
//! # Safety
//!
//! compio streams do not expose socket options, so the raw descriptor is
//! borrowed into a `socket2::Socket` that is never dropped.

#![allow(unsafe_code)]

use std::io;
use std::mem::ManuallyDrop;

/// Enable TCP_NODELAY on a compio TcpStream.
///
/// # Errors
///
/// Returns an error if the socket option cannot be set.
#[inline]
pub fn enable_tcp_nodelay(stream: &compio::net::TcpStream) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::io::{AsRawFd, FromRawFd};
        let fd = stream.as_raw_fd();
        // Not ours to close.
        let sock = ManuallyDrop::new(unsafe { socket2::Socket::from_raw_fd(fd) });
        sock.set_nodelay(true)
    }

    #[cfg(windows)]
    {
        use std::os::windows::io::{AsRawSocket, FromRawSocket};
        let raw = stream.as_raw_socket();
        let sock = ManuallyDrop::new(unsafe { socket2::Socket::from_raw_socket(raw) });
        sock.set_nodelay(true)
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = stream;
        Ok(())
    }
}
