//! End-to-end tests: HelloServer against REQ clients over loopback.

use bytes::Bytes;
use compio::buf::BufResult;
use compio::io::AsyncWriteExt;
use compio::net::TcpStream;
use hwserver::config::Config;
use hwserver::dev_tracing::init_tracing;
use hwserver::server::HelloServer;
use hwserver_core::endpoint::Endpoint;
use hwserver_core::error::HwError;
use hwserver_core::options::SocketOptions;
use hwserver_zmtp::handshake::perform_handshake;
use hwserver_zmtp::{ReqSocket, SocketType};
use std::future::Future;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

fn test_config(max_requests: u64) -> Config {
    Config {
        bind: Endpoint::parse("tcp://127.0.0.1:0").unwrap(),
        work: Duration::ZERO,
        max_requests: Some(max_requests),
        handshake_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

async fn start(config: Config) -> (SocketAddr, impl Future<Output = Result<u64, HwError>>) {
    init_tracing();
    let mut server = HelloServer::bind(config).await.unwrap();
    let addr = server.local_addr();
    let task = compio::runtime::spawn(async move { server.run().await });
    (addr, task)
}

async fn client(addr: SocketAddr) -> ReqSocket {
    ReqSocket::connect(&Endpoint::Tcp(addr), SocketOptions::default())
        .await
        .unwrap()
}

async fn hello(req: &mut ReqSocket) -> Vec<Bytes> {
    req.send(vec![Bytes::from_static(b"Hello")]).await.unwrap();
    req.recv().await.unwrap().expect("reply")
}

#[compio::test]
async fn test_replies_world_to_each_hello() {
    let (addr, server) = start(test_config(3)).await;

    let mut req = client(addr).await;
    assert_eq!(req.peer_socket_type(), SocketType::Rep);
    for _ in 0..3 {
        assert_eq!(hello(&mut req).await, vec![Bytes::from_static(b"World")]);
    }

    assert_eq!(server.await.unwrap(), 3);
}

#[compio::test]
async fn test_serves_peers_one_after_another() {
    let (addr, server) = start(test_config(2)).await;

    let mut first = client(addr).await;
    assert_eq!(hello(&mut first).await, vec![Bytes::from_static(b"World")]);
    drop(first);

    let mut second = client(addr).await;
    assert_eq!(hello(&mut second).await, vec![Bytes::from_static(b"World")]);

    assert_eq!(server.await.unwrap(), 2);
}

#[compio::test]
async fn test_survives_bad_greeting() {
    let (addr, server) = start(test_config(1)).await;

    {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let BufResult(res, _) = stream.write_all(vec![0u8; 64]).await;
        res.unwrap();
    }

    let mut req = client(addr).await;
    assert_eq!(hello(&mut req).await, vec![Bytes::from_static(b"World")]);
    assert_eq!(server.await.unwrap(), 1);
}

#[compio::test]
async fn test_survives_incompatible_peer() {
    let (addr, server) = start(test_config(1)).await;

    {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let result = perform_handshake(
            &mut stream,
            SocketType::Rep,
            None,
            Some(Duration::from_secs(5)),
        )
        .await;
        assert!(result.is_err());
    }

    let mut req = client(addr).await;
    assert_eq!(hello(&mut req).await, vec![Bytes::from_static(b"World")]);
    assert_eq!(server.await.unwrap(), 1);
}

#[compio::test]
async fn test_custom_reply_after_work_delay() {
    let config = Config {
        reply: "Welt".to_string(),
        work: Duration::from_millis(100),
        ..test_config(1)
    };
    let (addr, server) = start(config).await;

    let mut req = client(addr).await;
    let started = Instant::now();
    assert_eq!(hello(&mut req).await, vec![Bytes::from_static(b"Welt")]);
    assert!(started.elapsed() >= Duration::from_millis(100));

    assert_eq!(server.await.unwrap(), 1);
}

#[compio::test]
async fn test_bind_conflict_is_fatal() {
    let first = HelloServer::bind(test_config(1)).await.unwrap();
    let taken = Config {
        bind: Endpoint::Tcp(first.local_addr()),
        ..test_config(1)
    };

    let err = HelloServer::bind(taken).await.err().expect("address in use");
    assert!(!err.is_connection_error());
}

#[compio::test]
async fn test_survives_oversized_request() {
    let config = Config {
        max_msg_size: Some(16),
        ..test_config(1)
    };
    let (addr, server) = start(config).await;

    {
        let mut greedy = client(addr).await;
        greedy
            .send(vec![
                Bytes::from_static(b"0123456789"),
                Bytes::from_static(b"0123456789"),
            ])
            .await
            .unwrap();
        // The session is dropped instead of answered
        assert!(!matches!(greedy.recv().await, Ok(Some(_))));
    }

    let mut req = client(addr).await;
    assert_eq!(hello(&mut req).await, vec![Bytes::from_static(b"World")]);
    assert_eq!(server.await.unwrap(), 1);
}

#[compio::test]
async fn test_bind_rejects_invalid_config() {
    let config = Config {
        reply: String::new(),
        ..test_config(1)
    };

    let err = HelloServer::bind(config).await.err().expect("empty reply");
    assert!(matches!(err, HwError::Config(_)));
    assert!(!err.is_connection_error());
}
