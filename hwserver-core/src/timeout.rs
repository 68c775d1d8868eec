//! Timeout wrappers for owned-buffer I/O.
//!
//! Every helper takes an `Option<Duration>`:
//! - `None`: block indefinitely
//! - `Some(Duration::ZERO)`: non-blocking, fails with `WouldBlock`
//! - `Some(d)`: fails with `TimedOut` once `d` elapses

use compio::buf::{BufResult, IoBuf, IoBufMut};
use compio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use compio::time::timeout;
use std::future::Future;
use std::io;
use std::time::Duration;

async fn bounded<F, T>(fut: F, duration: Option<Duration>, what: &str) -> io::Result<T>
where
    F: Future<Output = T>,
{
    match duration {
        None => Ok(fut.await),
        Some(d) if d.is_zero() => Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            format!("{what} would block in non-blocking mode"),
        )),
        Some(d) => timeout(d, fut).await.map_err(|_| {
            io::Error::new(
                io::ErrorKind::TimedOut,
                format!("{what} timed out after {d:?}"),
            )
        }),
    }
}

/// Read whatever is available into `buf`, bounded by `duration`.
pub async fn read_with_timeout<S, B>(
    stream: &mut S,
    buf: B,
    duration: Option<Duration>,
) -> io::Result<BufResult<usize, B>>
where
    S: AsyncRead + Unpin,
    B: IoBufMut,
{
    bounded(stream.read(buf), duration, "Read operation").await
}

/// Write all of `buf`, bounded by `duration`.
pub async fn write_all_with_timeout<S, B>(
    stream: &mut S,
    buf: B,
    duration: Option<Duration>,
) -> io::Result<BufResult<(), B>>
where
    S: AsyncWrite + Unpin,
    B: IoBuf,
{
    bounded(stream.write_all(buf), duration, "Write operation").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[compio::test]
    async fn zero_duration_would_block() {
        let err = bounded(async { 1u8 }, Some(Duration::ZERO), "Probe")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }

    #[compio::test]
    async fn elapsed_duration_times_out() {
        let slow = compio::time::sleep(Duration::from_millis(200));
        let err = bounded(slow, Some(Duration::from_millis(10)), "Probe")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[compio::test]
    async fn unbounded_passes_output_through() {
        assert_eq!(bounded(async { 7u8 }, None, "Probe").await.unwrap(), 7);
    }
}
