//! Channel-wise mean aggregation.

use super::{AggregationError, MeanKind};
use crate::capture::TRACKED_COORDINATES;
use crate::color::{ColorSet, Rgba};

/// Running channel sums for one coordinate.
///
/// Quadratic sums hold squared channel values. The kind is fixed at
/// construction so arithmetic and quadratic sums never mix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSums {
    kind: MeanKind,
    red: f64,
    green: f64,
    blue: f64,
    count: u64,
}

impl ChannelSums {
    /// Creates empty sums of the given kind.
    pub fn new(kind: MeanKind) -> Self {
        Self {
            kind,
            red: 0.0,
            green: 0.0,
            blue: 0.0,
            count: 0,
        }
    }

    /// Sums the given colors.
    pub fn from_colors(kind: MeanKind, colors: &[Rgba]) -> Self {
        let mut sums = Self::new(kind);
        sums.extend(colors);
        sums
    }

    /// Adds one color.
    pub fn add(&mut self, color: Rgba) {
        let kind = self.kind;
        let term = |channel: u8| {
            let value = f64::from(channel);
            match kind {
                MeanKind::Arithmetic => value,
                MeanKind::Quadratic => value * value,
            }
        };
        self.red += term(color.r);
        self.green += term(color.g);
        self.blue += term(color.b);
        self.count += 1;
    }

    /// Adds every color in order.
    pub fn extend(&mut self, colors: &[Rgba]) {
        colors.iter().for_each(|&c| self.add(c));
    }

    /// Kind fixed at construction.
    pub fn kind(&self) -> MeanKind {
        self.kind
    }

    /// Number of colors summed.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the mean color, or `None` if nothing was summed.
    ///
    /// Channels are rounded half away from zero and clamped to 0..=255.
    pub fn mean(&self) -> Option<Rgba> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        let channel = |sum: f64| {
            let mean = sum / n;
            let value = match self.kind {
                MeanKind::Arithmetic => mean,
                MeanKind::Quadratic => mean.sqrt(),
            };
            value.round().clamp(0.0, 255.0) as u8
        };
        Some(Rgba::opaque(
            channel(self.red),
            channel(self.green),
            channel(self.blue),
        ))
    }
}

/// Computes the mean color of each coordinate from this set alone.
///
/// Calling it twice on the same set yields the same colors.
pub fn mean_colors(
    set: &ColorSet,
    kind: MeanKind,
) -> Result<[Rgba; TRACKED_COORDINATES], AggregationError> {
    let mut colors = [Rgba::opaque(0, 0, 0); TRACKED_COORDINATES];
    for (coordinate, sequence) in set.sequences().iter().enumerate() {
        colors[coordinate] = ChannelSums::from_colors(kind, sequence)
            .mean()
            .ok_or(AggregationError::EmptySequence { coordinate })?;
    }
    Ok(colors)
}

/// Mean over every round pushed since creation or the last reset.
///
/// This is the smoothing variant: earlier rounds keep contributing to the
/// result. Pushing a round with a different [`MeanKind`] discards the
/// accumulated sums first.
#[derive(Debug, Clone)]
pub struct SmoothingAverager {
    sums: [ChannelSums; TRACKED_COORDINATES],
    rounds: u64,
}

impl SmoothingAverager {
    /// Creates an averager with no rounds.
    pub fn new(kind: MeanKind) -> Self {
        Self {
            sums: [ChannelSums::new(kind); TRACKED_COORDINATES],
            rounds: 0,
        }
    }

    /// Adds a round and returns the smoothed colors.
    pub fn push(
        &mut self,
        set: &ColorSet,
        kind: MeanKind,
    ) -> Result<[Rgba; TRACKED_COORDINATES], AggregationError> {
        // a rejected round leaves sums and round count untouched
        if let Some(coordinate) = set.sequences().iter().position(Vec::is_empty) {
            return Err(AggregationError::EmptySequence { coordinate });
        }
        if self.kind() != kind {
            tracing::debug!(?kind, "Mean kind changed, resetting smoothing sums");
            *self = Self::new(kind);
        }

        for (sums, sequence) in self.sums.iter_mut().zip(set.sequences()) {
            sums.extend(sequence);
        }
        self.rounds += 1;

        let mut colors = [Rgba::opaque(0, 0, 0); TRACKED_COORDINATES];
        for (coordinate, sums) in self.sums.iter().enumerate() {
            colors[coordinate] = sums
                .mean()
                .ok_or(AggregationError::EmptySequence { coordinate })?;
        }
        Ok(colors)
    }

    /// Discards all accumulated rounds.
    pub fn reset(&mut self) {
        *self = Self::new(self.kind());
        tracing::info!("Smoothing averager reset");
    }

    /// Kind of the accumulated sums.
    pub fn kind(&self) -> MeanKind {
        self.sums[0].kind()
    }

    /// Rounds pushed since the last reset.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Samples accumulated for one coordinate since the last reset.
    pub fn samples(&self, coordinate: usize) -> u64 {
        self.sums.get(coordinate).map_or(0, ChannelSums::count)
    }
}

impl Default for SmoothingAverager {
    fn default() -> Self {
        Self::new(MeanKind::default())
    }
}
