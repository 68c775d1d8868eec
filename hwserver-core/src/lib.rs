//! hwserver Core
//!
//! Runtime building blocks shared by the protocol and application crates:
//! - Zero-copy segmented buffer (`buffer`)
//! - Endpoint parsing (`endpoint`)
//! - Error types (`error`)
//! - `Bytes` as a compio write buffer (`iobuf`)
//! - Socket options (`options`)
//! - Cancellation guard for partial writes (`poison`)
//! - TCP tuning (`tcp`) and timed I/O helpers (`timeout`)

// The tcp and iobuf modules need raw fd / buffer access
#![cfg_attr(not(test), deny(unsafe_code))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod endpoint;
pub mod error;
pub mod iobuf;
pub mod options;
pub mod poison;
pub mod tcp;
pub mod timeout;
