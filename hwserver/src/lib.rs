//! # hwserver
//!
//! Request/reply "hello world" server on a ZMTP 3.x REP socket.
//!
//! Binds `tcp://*:5560` by default, waits for a request, logs
//! `Received Hello`, sleeps for a second of simulated work and replies
//! `World`. Any libzmq REQ or DEALER peer can talk to it.
//!
//! ```rust,no_run
//! use hwserver::config::Config;
//! use hwserver::server::HelloServer;
//!
//! #[compio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = HelloServer::bind(Config::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dev_tracing;
pub mod server;

pub use config::Config;
pub use server::HelloServer;
