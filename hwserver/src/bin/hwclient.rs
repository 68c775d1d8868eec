//! hwclient: sends `Hello` to an hwserver and prints each reply.

use bytes::Bytes;
use clap::Parser;
use hwserver::dev_tracing::init_logging;
use hwserver_core::endpoint::Endpoint;
use hwserver_core::options::SocketOptions;
use hwserver_zmtp::ReqSocket;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "hwclient")]
#[command(version)]
#[command(about = "Request/reply hello world client", long_about = None)]
struct ClientArgs {
    /// Endpoint to connect to
    #[arg(short, long, default_value = "tcp://localhost:5560")]
    connect: String,

    /// Number of requests to send
    #[arg(short = 'n', long, default_value_t = 10)]
    requests: u32,

    /// Request payload
    #[arg(short, long, default_value = "Hello")]
    message: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[compio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ClientArgs::parse();
    init_logging(&args.log_level);

    let endpoint = Endpoint::parse(&args.connect)?;
    info!(%endpoint, "Connecting to hello world server");
    let mut socket = ReqSocket::connect(&endpoint, SocketOptions::default()).await?;

    let request = Bytes::from(args.message.into_bytes());
    for n in 0..args.requests {
        info!(request = n, "Sending Hello");
        socket.send(vec![request.clone()]).await?;

        let Some(reply) = socket.recv().await? else {
            warn!(request = n, "Server closed the connection");
            break;
        };
        let text: Vec<_> = reply.iter().map(|f| String::from_utf8_lossy(f)).collect();
        info!(request = n, reply = %text.join(" | "), "Received reply");
    }

    Ok(())
}
