//! `Bytes` as a compio write buffer.
//!
//! compio takes ownership of write buffers for the duration of the
//! operation, so encoded frames are frozen into `Bytes` and handed over
//! through this wrapper instead of being copied into a `Vec`.

#![allow(unsafe_code)]

use bytes::Bytes;

/// Zero-copy `IoBuf` wrapper for `Bytes`.
pub struct IoBytes(Bytes);

impl IoBytes {
    pub const fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

// SAFETY: `Bytes` is immutable and refcounted, so the pointer stays valid
// and unaliased by writers for as long as the wrapper is owned by the op.
unsafe impl compio::buf::IoBuf for IoBytes {
    #[inline]
    fn as_buf_ptr(&self) -> *const u8 {
        self.0.as_ptr()
    }

    #[inline]
    fn buf_len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    fn buf_capacity(&self) -> usize {
        self.0.len()
    }
}
