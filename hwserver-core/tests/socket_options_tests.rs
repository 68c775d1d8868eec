//! Integration tests for socket options

use hwserver_core::options::{SocketOptions, DEFAULT_HANDSHAKE_TIMEOUT};
use std::time::Duration;

#[test]
fn test_default_values() {
    let opts = SocketOptions::default();

    assert_eq!(opts.recv_timeout, None); // Block forever
    assert_eq!(opts.send_timeout, None);
    assert_eq!(opts.handshake_timeout, DEFAULT_HANDSHAKE_TIMEOUT);
    assert_eq!(opts.max_msg_size, None); // No limit
    assert_eq!(opts.read_buffer_size, 4096);
    assert!(opts.tcp_nodelay);
}

#[test]
fn test_builder_chain() {
    let opts = SocketOptions::default()
        .with_recv_timeout(Duration::from_millis(250))
        .with_send_timeout(Duration::from_millis(500))
        .with_handshake_timeout(Duration::from_secs(2))
        .with_max_msg_size(64)
        .with_read_buffer_size(512)
        .with_tcp_nodelay(false);

    assert_eq!(opts.recv_timeout, Some(Duration::from_millis(250)));
    assert_eq!(opts.send_timeout, Some(Duration::from_millis(500)));
    assert_eq!(opts.handshake_timeout, Duration::from_secs(2));
    assert_eq!(opts.max_msg_size, Some(64));
    assert_eq!(opts.read_buffer_size, 512);
    assert!(!opts.tcp_nodelay);
}

#[test]
fn test_handshake_deadline() {
    let opts = SocketOptions::default().with_handshake_timeout(Duration::ZERO);
    assert_eq!(opts.handshake_deadline(), None); // Disabled

    let opts = SocketOptions::default().with_handshake_timeout(Duration::from_secs(3));
    assert_eq!(opts.handshake_deadline(), Some(Duration::from_secs(3)));
}

#[test]
fn test_read_buffer_never_zero() {
    let opts = SocketOptions::default().with_read_buffer_size(0);
    assert_eq!(opts.read_buffer_size, 1);
}
