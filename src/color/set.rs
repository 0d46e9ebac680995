//! Per-coordinate color sequences.

use super::{DecodeError, Rgba};
use crate::capture::{SampleBuffers, TRACKED_COORDINATES};

/// Decoded samples, one ordered sequence per tracked coordinate.
///
/// Sequence `i` belongs to tracked coordinate `i` and holds its samples
/// oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorSet {
    sequences: [Vec<Rgba>; TRACKED_COORDINATES],
}

impl ColorSet {
    /// Wraps one sample sequence per coordinate.
    pub fn new(sequences: [Vec<Rgba>; TRACKED_COORDINATES]) -> Self {
        Self { sequences }
    }

    /// Drains `buffers` and decodes every token they hold.
    ///
    /// The buffers are empty afterwards whether or not decoding succeeds.
    /// The first malformed token fails the whole set; on error the index of
    /// the offending coordinate is returned alongside the decode error.
    pub fn drain_from(buffers: &mut SampleBuffers) -> Result<Self, (usize, DecodeError)> {
        let texts = buffers.take_all();
        let mut set = Self::default();

        for (index, text) in texts.iter().enumerate() {
            for token in text.split_whitespace() {
                let color = Rgba::from_hex_token(token).map_err(|e| (index, e))?;
                set.sequences[index].push(color);
            }
        }

        Ok(set)
    }

    /// Returns all sequences in coordinate order.
    pub fn sequences(&self) -> &[Vec<Rgba>; TRACKED_COORDINATES] {
        &self.sequences
    }

    /// Returns the sequence for one coordinate.
    pub fn sequence(&self, index: usize) -> Option<&[Rgba]> {
        self.sequences.get(index).map(Vec::as_slice)
    }

    /// Total number of samples across all coordinates.
    pub fn total_samples(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }

    /// True if no coordinate holds any sample.
    pub fn is_empty(&self) -> bool {
        self.total_samples() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_decodes_in_sampling_order() {
        let mut buffers = SampleBuffers::from(["#34a853 #000000 ", "#fabc05 ", "#e94334 "]);

        let set = ColorSet::drain_from(&mut buffers).unwrap();

        assert_eq!(
            set.sequences(),
            &[
                vec![Rgba::new(52, 168, 83, 255), Rgba::new(0, 0, 0, 255)],
                vec![Rgba::new(250, 188, 5, 255)],
                vec![Rgba::new(233, 67, 52, 255)],
            ]
        );
        assert_eq!(set.total_samples(), 4);
    }

    #[test]
    fn test_drain_clears_buffers_on_success() {
        let mut buffers = SampleBuffers::from(["#34a853 ", "#fabc05 ", "#e94334 "]);
        ColorSet::drain_from(&mut buffers).unwrap();
        assert_eq!(buffers.total_len(), 0);
    }

    #[test]
    fn test_drain_fails_on_first_bad_token_and_clears() {
        let mut buffers = SampleBuffers::from(["#34a853 ", "#fabc05 #nothex ", "#e94334 "]);

        let err = ColorSet::drain_from(&mut buffers).unwrap_err();

        assert_eq!(err.0, 1);
        assert!(matches!(err.1, DecodeError::InvalidDigit { .. }));
        assert_eq!(buffers.total_len(), 0);
    }

    #[test]
    fn test_default_set_has_three_empty_sequences() {
        let set = ColorSet::default();
        assert_eq!(set.sequences().len(), 3);
        assert!(set.is_empty());
        assert_eq!(set.sequence(2), Some(&[][..]));
        assert_eq!(set.sequence(3), None);
    }
}
