//! Receive-side byte queue for frame decoding.

use bytes::{Bytes, BytesMut};
use std::collections::VecDeque;

/// Bytes received from a peer, kept as the segments the reads produced.
///
/// A frame decoder `peek`s at headers, `skip`s them once parsed and
/// `split_front`s the body. A body that lies inside one segment comes back
/// as a refcounted slice of it; one that spans reads is gathered into a
/// fresh allocation.
#[derive(Debug, Default)]
pub struct SegmentedBuffer {
    segs: VecDeque<Bytes>,
    len: usize,
}

impl SegmentedBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            segs: VecDeque::new(),
            len: 0,
        }
    }

    /// Total buffered bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one read's worth of data.
    pub fn push(&mut self, bytes: Bytes) {
        if !bytes.is_empty() {
            self.len += bytes.len();
            self.segs.push_back(bytes);
        }
    }

    /// Fill `dst` from the front without consuming anything.
    ///
    /// Returns `false`, leaving `dst` unspecified, if fewer than
    /// `dst.len()` bytes are buffered.
    pub fn peek(&self, dst: &mut [u8]) -> bool {
        if dst.len() > self.len {
            return false;
        }
        let src = self.segs.iter().flat_map(|seg| seg.iter());
        for (out, byte) in dst.iter_mut().zip(src) {
            *out = *byte;
        }
        true
    }

    /// Discard up to `n` bytes from the front.
    pub fn skip(&mut self, n: usize) {
        self.drain(n, drop);
    }

    /// Remove exactly `n` bytes from the front, or `None` if fewer are buffered.
    pub fn split_front(&mut self, n: usize) -> Option<Bytes> {
        if n > self.len {
            return None;
        }
        if self.segs.front().map_or(true, |seg| seg.len() >= n) {
            let mut out = Bytes::new();
            self.drain(n, |piece| out = piece);
            return Some(out);
        }

        let mut out = BytesMut::with_capacity(n);
        self.drain(n, |piece| out.extend_from_slice(&piece));
        Some(out.freeze())
    }

    /// Pop up to `n` bytes off the front, handing them to `sink` one
    /// segment-sized piece at a time.
    fn drain(&mut self, n: usize, mut sink: impl FnMut(Bytes)) {
        let mut remaining = n.min(self.len);
        self.len -= remaining;
        while remaining > 0 {
            let Some(seg) = self.segs.front_mut() else {
                break;
            };
            if seg.len() > remaining {
                sink(seg.split_to(remaining));
                break;
            }
            remaining -= seg.len();
            if let Some(whole) = self.segs.pop_front() {
                sink(whole);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffered(parts: &[&'static [u8]]) -> SegmentedBuffer {
        let mut buf = SegmentedBuffer::new();
        for part in parts {
            buf.push(Bytes::from_static(part));
        }
        buf
    }

    #[test]
    fn split_within_first_segment_is_a_slice() {
        let seg = Bytes::from_static(b"HelloWorld");
        let mut buf = SegmentedBuffer::new();
        buf.push(seg.clone());

        let out = buf.split_front(5).unwrap();
        assert_eq!(&out[..], b"Hello");
        assert_eq!(out.as_ptr(), seg.as_ptr());
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn split_across_segments_gathers() {
        let mut buf = buffered(&[b"He", b"llo", b"!"]);

        assert_eq!(&buf.split_front(4).unwrap()[..], b"Hell");
        assert_eq!(buf.len(), 2);
        assert_eq!(&buf.split_front(2).unwrap()[..], b"o!");
        assert!(buf.is_empty());
    }

    #[test]
    fn split_more_than_buffered_leaves_data() {
        let mut buf = buffered(&[b"abc"]);
        assert!(buf.split_front(4).is_none());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn empty_pushes_are_ignored() {
        let mut buf = SegmentedBuffer::new();
        buf.push(Bytes::new());
        assert!(buf.is_empty());
        assert_eq!(buf.split_front(0).unwrap().len(), 0);
    }

    #[test]
    fn peek_then_skip_header() {
        let mut buf = buffered(&[b"\x01", b"\x05World"]);

        let mut hdr = [0u8; 2];
        assert!(buf.peek(&mut hdr));
        assert_eq!(hdr, [0x01, 0x05]);
        assert_eq!(buf.len(), 7);

        buf.skip(2);
        assert_eq!(&buf.split_front(5).unwrap()[..], b"World");
    }

    #[test]
    fn peek_short_buffer_fails() {
        let buf = buffered(&[b"\x02\x00"]);
        let mut hdr = [0u8; 9];
        assert!(!buf.peek(&mut hdr));
    }
}
