//! RAII guard against partial writes in async contexts.
//!
//! When a write future is dropped mid-flight (timeout, shutdown), half a ZMTP
//! frame may already be on the wire and the stream can no longer be framed.
//! `PoisonGuard` marks the stream poisoned on creation and only clears the
//! flag when `disarm()` is called after the write completed.
//!
//! ```rust
//! use hwserver_core::poison::PoisonGuard;
//!
//! let mut poisoned = false;
//! let guard = PoisonGuard::new(&mut poisoned);
//! // ... write the whole reply ...
//! guard.disarm();
//! assert!(!poisoned);
//! ```
//!
//! Once poisoned, the peer session must be dropped.

/// Marks a connection poisoned unless disarmed.
pub struct PoisonGuard<'a> {
    flag: &'a mut bool,
}

impl<'a> PoisonGuard<'a> {
    #[inline]
    pub fn new(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }

    /// Only call once the entire I/O operation has completed.
    #[inline]
    pub fn disarm(self) {
        *self.flag = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poison_on_drop() {
        let mut poisoned = false;
        {
            let _guard = PoisonGuard::new(&mut poisoned);
        }
        assert!(poisoned, "Connection should be poisoned when guard is dropped");
    }

    #[test]
    fn test_disarm_clears_poison() {
        let mut poisoned = true;
        PoisonGuard::new(&mut poisoned).disarm();
        assert!(!poisoned, "Connection should be healthy after disarm");
    }
}
