//! Most-opaque selection.

use super::AggregationError;
use crate::capture::TRACKED_COORDINATES;
use crate::color::{ColorSet, Rgba};

/// Picks the sample with the lowest red channel for each coordinate.
///
/// Among samples with equal red, the earliest sampled one wins.
pub fn most_opaque(set: &ColorSet) -> Result<[Rgba; TRACKED_COORDINATES], AggregationError> {
    let mut colors = [Rgba::opaque(0, 0, 0); TRACKED_COORDINATES];
    for (coordinate, sequence) in set.sequences().iter().enumerate() {
        // min_by_key keeps the first of equal minima
        colors[coordinate] = sequence
            .iter()
            .copied()
            .min_by_key(|c| c.r)
            .ok_or(AggregationError::EmptySequence { coordinate })?;
    }
    Ok(colors)
}
