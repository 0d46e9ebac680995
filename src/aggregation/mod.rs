//! Reduction of per-coordinate samples to one representative color.
//!
//! Two mutually exclusive strategies exist:
//!
//! - **Mean**: channel-wise arithmetic or quadratic mean. Available as a
//!   per-round function ([`mean_colors`]) that is idempotent on identical
//!   input, and as an explicit smoothing accumulator ([`SmoothingAverager`])
//!   that carries sums across rounds until reset.
//! - **Most opaque**: the sample with the lowest red channel
//!   ([`most_opaque`]).

mod mean;
mod opaque;

pub use mean::{mean_colors, ChannelSums, SmoothingAverager};
pub use opaque::most_opaque;

use crate::capture::TRACKED_COORDINATES;
use crate::color::Rgba;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// A coordinate has no samples to reduce.
    #[error("no samples collected for coordinate {coordinate}")]
    EmptySequence {
        /// Index of the empty coordinate.
        coordinate: usize,
    },
}

/// How channel sums are turned into a mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeanKind {
    /// `sum / n`
    #[default]
    Arithmetic,
    /// `sqrt(sum of squares / n)`
    Quadratic,
}

/// Aggregation strategy selected by configuration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Per-round arithmetic mean.
    Mean,
    /// Per-round quadratic mean.
    Quadratic,
    /// Arithmetic mean smoothed across rounds.
    Smoothed,
    /// Quadratic mean smoothed across rounds.
    SmoothedQuadratic,
    /// Lowest red channel per coordinate.
    #[default]
    Opaque,
}

impl Strategy {
    /// The mean kind used by mean-based strategies.
    pub fn mean_kind(self) -> Option<MeanKind> {
        match self {
            Self::Mean | Self::Smoothed => Some(MeanKind::Arithmetic),
            Self::Quadratic | Self::SmoothedQuadratic => Some(MeanKind::Quadratic),
            Self::Opaque => None,
        }
    }

    /// True for strategies that carry sums across rounds.
    pub fn is_smoothed(self) -> bool {
        matches!(self, Self::Smoothed | Self::SmoothedQuadratic)
    }
}

/// Representative colors of one round, tagged by the strategy that chose them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateResult {
    /// Channel means, per round or smoothed.
    Average([Rgba; TRACKED_COORDINATES]),
    /// Lowest-red sample of each coordinate.
    Opaque([Rgba; TRACKED_COORDINATES]),
}

impl AggregateResult {
    /// The three colors in coordinate order.
    pub fn colors(&self) -> &[Rgba; TRACKED_COORDINATES] {
        match self {
            Self::Average(colors) | Self::Opaque(colors) => colors,
        }
    }
}
