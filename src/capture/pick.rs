//! Interactive coordinate capture.
//!
//! The user picks the three tracked coordinates by clicking on them. The
//! OS click hook is an external collaborator that feeds clicked positions
//! into a channel; capture itself is bounded by a deadline and returns
//! the first three clicks in click order.

use super::{TrackedCoordinate, TrackedCoords, TRACKED_COORDINATES};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur while capturing coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The timeout elapsed before three clicks arrived.
    #[error("timed out after {received} of 3 clicks")]
    TimedOut {
        /// Clicks received before the timeout.
        received: usize,
    },
    /// The click source went away before three clicks arrived.
    #[error("click source closed after {received} of 3 clicks")]
    Disconnected {
        /// Clicks received before the source closed.
        received: usize,
    },
}

/// Capability to obtain the tracked coordinates from the user.
pub trait CoordinateCapture {
    /// Blocks until three clicks are observed or `timeout` elapses.
    ///
    /// A timeout too large to represent as a deadline waits without bound.
    fn capture(&mut self, timeout: Duration) -> Result<TrackedCoords, CaptureError>;
}

/// Captures clicks delivered over a channel.
pub struct ChannelCapture {
    clicks: Receiver<TrackedCoordinate>,
}

impl ChannelCapture {
    /// Reads clicks from `clicks`.
    pub fn new(clicks: Receiver<TrackedCoordinate>) -> Self {
        Self { clicks }
    }
}

impl CoordinateCapture for ChannelCapture {
    fn capture(&mut self, timeout: Duration) -> Result<TrackedCoords, CaptureError> {
        let deadline = Instant::now().checked_add(timeout);
        let mut picked = Vec::with_capacity(TRACKED_COORDINATES);

        while picked.len() < TRACKED_COORDINATES {
            let click = match deadline {
                Some(deadline) => self
                    .clicks
                    .recv_timeout(deadline.saturating_duration_since(Instant::now())),
                None => self
                    .clicks
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };
            match click {
                Ok(click) => {
                    tracing::info!(index = picked.len(), %click, "Coordinate picked");
                    picked.push(click);
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(CaptureError::TimedOut {
                        received: picked.len(),
                    })
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CaptureError::Disconnected {
                        received: picked.len(),
                    })
                }
            }
        }

        let coords: [TrackedCoordinate; TRACKED_COORDINATES] = [picked[0], picked[1], picked[2]];
        Ok(TrackedCoords::new(coords))
    }
}

/// Parses a textual click of the form `x,y` (whitespace tolerated).
pub fn parse_click(line: &str) -> Option<TrackedCoordinate> {
    let (x, y) = line.trim().split_once(',')?;
    Some(TrackedCoordinate::new(
        x.trim().parse().ok()?,
        y.trim().parse().ok()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_capture_returns_clicks_in_order() {
        let (tx, rx) = mpsc::channel();
        for (x, y) in [(244, 182), (258, 193), (240, 206), (1, 1)] {
            tx.send(TrackedCoordinate::new(x, y)).unwrap();
        }

        let coords = ChannelCapture::new(rx)
            .capture(Duration::from_secs(1))
            .unwrap();

        assert_eq!(
            coords.as_slice(),
            &[
                TrackedCoordinate::new(244, 182),
                TrackedCoordinate::new(258, 193),
                TrackedCoordinate::new(240, 206),
            ]
        );
    }

    #[test]
    fn test_capture_times_out() {
        let (tx, rx) = mpsc::channel();
        tx.send(TrackedCoordinate::new(1, 2)).unwrap();

        let result = ChannelCapture::new(rx).capture(Duration::from_millis(20));

        assert_eq!(result, Err(CaptureError::TimedOut { received: 1 }));
        drop(tx);
    }

    #[test]
    fn test_capture_disconnected() {
        let (tx, rx) = mpsc::channel();
        tx.send(TrackedCoordinate::new(1, 2)).unwrap();
        tx.send(TrackedCoordinate::new(3, 4)).unwrap();
        drop(tx);

        let result = ChannelCapture::new(rx).capture(Duration::from_secs(1));

        assert_eq!(result, Err(CaptureError::Disconnected { received: 2 }));
    }

    #[test]
    fn test_capture_with_unbounded_timeout() {
        let (tx, rx) = mpsc::channel();
        for (x, y) in [(1, 2), (3, 4), (5, 6)] {
            tx.send(TrackedCoordinate::new(x, y)).unwrap();
        }
        let coords = ChannelCapture::new(rx).capture(Duration::MAX).unwrap();
        assert_eq!(coords.as_slice()[2], TrackedCoordinate::new(5, 6));

        let (tx, rx) = mpsc::channel();
        tx.send(TrackedCoordinate::new(1, 2)).unwrap();
        drop(tx);
        let result = ChannelCapture::new(rx).capture(Duration::from_millis(u64::MAX));
        assert_eq!(result, Err(CaptureError::Disconnected { received: 1 }));
    }

    #[test]
    fn test_parse_click() {
        assert_eq!(parse_click(" 699, 328\n"), Some(TrackedCoordinate::new(699, 328)));
        assert_eq!(parse_click("699"), None);
        assert_eq!(parse_click("a,b"), None);
    }
}
