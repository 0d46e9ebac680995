//! Tracked screen coordinates.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of screen coordinates every pipeline tracks.
pub const TRACKED_COORDINATES: usize = 3;

/// A screen pixel location polled for color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackedCoordinate {
    /// Horizontal screen position.
    pub x: i32,
    /// Vertical screen position.
    pub y: i32,
}

impl TrackedCoordinate {
    /// Creates a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TrackedCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Exactly three tracked coordinates, in sampling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedCoords([TrackedCoordinate; TRACKED_COORDINATES]);

impl TrackedCoords {
    /// Wraps three coordinates.
    pub const fn new(coords: [TrackedCoordinate; TRACKED_COORDINATES]) -> Self {
        Self(coords)
    }

    /// Validates a coordinate list read from configuration or capture.
    pub fn from_slice(coords: &[TrackedCoordinate]) -> Result<Self, ConfigError> {
        if coords.is_empty() {
            return Err(ConfigError::NoCoordinates);
        }
        let coords: [TrackedCoordinate; TRACKED_COORDINATES] = coords
            .try_into()
            .map_err(|_| ConfigError::CoordinateCount { got: coords.len() })?;
        Ok(Self(coords))
    }

    /// Iterates in sampling order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedCoordinate> {
        self.0.iter()
    }

    /// The coordinates as a slice.
    pub fn as_slice(&self) -> &[TrackedCoordinate] {
        &self.0
    }
}
