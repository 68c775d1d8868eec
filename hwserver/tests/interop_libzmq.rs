//! HelloServer against libzmq peers.

use hwserver::config::Config;
use hwserver::server::HelloServer;
use hwserver_core::endpoint::Endpoint;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Run a server for `max_requests` replies on its own thread and runtime.
fn spawn_server(max_requests: u64) -> (String, thread::JoinHandle<u64>) {
    let (addr_tx, addr_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        compio::runtime::Runtime::new().unwrap().block_on(async move {
            let config = Config {
                bind: Endpoint::parse("tcp://127.0.0.1:0").unwrap(),
                work: Duration::ZERO,
                max_requests: Some(max_requests),
                ..Config::default()
            };
            let mut server = HelloServer::bind(config).await.unwrap();
            addr_tx.send(server.local_addr()).unwrap();
            server.run().await.unwrap()
        })
    });

    let addr = addr_rx.recv().unwrap();
    (format!("tcp://{addr}"), handle)
}

#[test]
fn test_libzmq_req_client() {
    let (endpoint, server) = spawn_server(3);

    let ctx = zmq::Context::new();
    let sock = ctx.socket(zmq::REQ).unwrap();
    sock.set_rcvtimeo(5000).unwrap();
    sock.connect(&endpoint).unwrap();

    for _ in 0..3 {
        sock.send("Hello", 0).unwrap();
        let reply = sock.recv_string(0).unwrap().unwrap();
        assert_eq!(reply, "World");
    }

    assert_eq!(server.join().unwrap(), 3);
}

#[test]
fn test_libzmq_dealer_keeps_envelope() {
    let (endpoint, server) = spawn_server(1);

    let ctx = zmq::Context::new();
    let sock = ctx.socket(zmq::DEALER).unwrap();
    sock.set_rcvtimeo(5000).unwrap();
    sock.connect(&endpoint).unwrap();

    sock.send_multipart([&b"route"[..], b"", b"Hello"], 0).unwrap();
    let reply = sock.recv_multipart(0).unwrap();
    assert_eq!(
        reply,
        vec![b"route".to_vec(), Vec::new(), b"World".to_vec()]
    );

    assert_eq!(server.join().unwrap(), 1);
}
