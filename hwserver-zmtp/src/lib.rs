//! # hwserver ZMTP
//!
//! ZeroMQ (ZMTP 3.x) request/reply sockets on compio.
//!
//! - **REP**: reply side, strict recv/send alternation with envelope tracking
//! - **REQ**: request side, strict send/recv alternation
//!
//! Both interoperate with libzmq 4.1+ peers over the NULL mechanism.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hwserver_zmtp::RepSocket;
//! use compio::net::TcpListener;
//! use bytes::Bytes;
//!
//! #[compio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let listener = TcpListener::bind("127.0.0.1:5560").await?;
//!     let (stream, _) = listener.accept().await?;
//!     let mut socket = RepSocket::from_tcp(stream).await?;
//!
//!     while let Some(_hello) = socket.recv().await? {
//!         socket.send(vec![Bytes::from_static(b"World")]).await?;
//!     }
//!     Ok(())
//! }
//! ```

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]

mod base;
pub mod codec;
pub mod command;
pub mod greeting;
pub mod handshake;
mod mechanism;
pub mod socket_type;

pub mod rep;
pub mod req;

pub use codec::ZmtpError;
pub use handshake::HandshakeResult;
pub use rep::{RepSocket, RepState};
pub use req::{ReqSocket, ReqState};
pub use socket_type::SocketType;
