//! Screen probe abstraction for pixel color reads.
//!
//! Moving the cursor and reading the pixel under it are external
//! capabilities. The sampling stage depends only on this trait, so real
//! platform backends and the mock are interchangeable.

use super::TrackedCoordinate;
use crate::color::Rgba;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while probing the screen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// A read happened before any move.
    #[error("cursor has not been positioned")]
    NotPositioned,
    /// The coordinate lies outside the screen.
    #[error("coordinate {0} is outside the screen")]
    OutOfBounds(TrackedCoordinate),
    /// The backend could not read the pixel.
    #[error("failed to read pixel color: {0}")]
    ReadFailed(String),
}

/// Capability to sample on-screen pixel colors.
pub trait ScreenProbe {
    /// Moves the cursor to the given screen coordinate.
    fn move_to(&mut self, coord: TrackedCoordinate) -> Result<(), ProbeError>;

    /// Reads the color under the cursor as six hex digits without `#`.
    fn read_color(&mut self) -> Result<String, ProbeError>;

    /// Pauses to let the screen settle between samples.
    fn wait(&mut self, duration: Duration);
}

/// Probe that produces synthetic colors without touching the screen.
///
/// Without a palette, colors are a deterministic function of the cursor
/// position and the read count. With a palette, each coordinate cycles
/// through its scripted colors. `wait` records the requested pause instead
/// of sleeping unless the probe is built with [`MockProbe::sleeping`].
/// Cursor moves are only kept after [`MockProbe::recording`].
#[derive(Debug, Default)]
pub struct MockProbe {
    cursor: Option<TrackedCoordinate>,
    palette: HashMap<TrackedCoordinate, Vec<Rgba>>,
    reads: HashMap<TrackedCoordinate, usize>,
    moves: Vec<TrackedCoordinate>,
    record: bool,
    waited: Duration,
    sleep: bool,
    screen: Option<(i32, i32)>,
}

impl MockProbe {
    /// Creates a probe that neither sleeps nor records moves.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a probe that really sleeps in `wait`.
    pub fn sleeping() -> Self {
        Self {
            sleep: true,
            ..Self::default()
        }
    }

    /// Scripts the colors reported at a coordinate.
    pub fn with_colors(mut self, coord: TrackedCoordinate, colors: Vec<Rgba>) -> Self {
        self.palette.insert(coord, colors);
        self
    }

    /// Keeps every cursor move for [`MockProbe::moves`].
    pub fn recording(mut self) -> Self {
        self.record = true;
        self
    }

    /// Restricts valid coordinates to a `width` x `height` screen.
    pub fn with_screen(mut self, width: i32, height: i32) -> Self {
        self.screen = Some((width, height));
        self
    }

    /// Every coordinate the cursor was moved to, in order. Empty unless
    /// the probe is recording.
    pub fn moves(&self) -> &[TrackedCoordinate] {
        &self.moves
    }

    /// Total pause requested through `wait`.
    pub fn waited(&self) -> Duration {
        self.waited
    }

    fn synthetic(coord: TrackedCoordinate, read: usize) -> Rgba {
        let seed = (coord.x as u32)
            .wrapping_mul(31)
            .wrapping_add((coord.y as u32).wrapping_mul(17))
            .wrapping_add((read as u32).wrapping_mul(7));
        Rgba::opaque(
            (seed % 256) as u8,
            ((seed >> 3) % 256) as u8,
            ((seed >> 5) % 256) as u8,
        )
    }
}

impl ScreenProbe for MockProbe {
    fn move_to(&mut self, coord: TrackedCoordinate) -> Result<(), ProbeError> {
        if let Some((width, height)) = self.screen {
            if coord.x < 0 || coord.y < 0 || coord.x >= width || coord.y >= height {
                return Err(ProbeError::OutOfBounds(coord));
            }
        }
        self.cursor = Some(coord);
        if self.record {
            self.moves.push(coord);
        }
        Ok(())
    }

    fn read_color(&mut self) -> Result<String, ProbeError> {
        let coord = self.cursor.ok_or(ProbeError::NotPositioned)?;
        let read = self.reads.entry(coord).or_insert(0);

        let color = match self.palette.get(&coord) {
            Some(colors) if !colors.is_empty() => colors[*read % colors.len()],
            Some(_) => {
                return Err(ProbeError::ReadFailed(format!(
                    "no scripted colors for {coord}"
                )))
            }
            None => Self::synthetic(coord, *read),
        };
        *read += 1;

        tracing::trace!(%coord, color = %color, "MockProbe read");
        Ok(color.to_hex())
    }

    fn wait(&mut self, duration: Duration) {
        self.waited += duration;
        if self.sleep {
            std::thread::sleep(duration);
        }
    }
}
