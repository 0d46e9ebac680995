//! Textual sample accumulation.

use super::TRACKED_COORDINATES;
use std::fmt::Write;

/// Append-only hex token buffers, one per tracked coordinate.
///
/// Each sample is stored as `#rrggbb ` (with a trailing space), so a buffer
/// reads as a whitespace separated token list in sampling order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleBuffers {
    buffers: [String; TRACKED_COORDINATES],
}

impl SampleBuffers {
    /// Creates three empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one probe reading (hex digits without `#`) to a buffer.
    ///
    /// Out of range indices are ignored.
    pub fn push(&mut self, index: usize, hex: &str) {
        if let Some(buffer) = self.buffers.get_mut(index) {
            // writing to a String cannot fail
            let _ = write!(buffer, "#{hex} ");
        }
    }

    /// Returns the accumulated text for one coordinate.
    pub fn text(&self, index: usize) -> Option<&str> {
        self.buffers.get(index).map(String::as_str)
    }

    /// Combined byte length of all buffers.
    pub fn total_len(&self) -> usize {
        self.buffers.iter().map(String::len).sum()
    }

    /// True if no buffer holds any text.
    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// Moves the accumulated text out, leaving every buffer empty.
    pub fn take_all(&mut self) -> [String; TRACKED_COORDINATES] {
        std::mem::take(&mut self.buffers)
    }

    /// Empties every buffer.
    pub fn clear(&mut self) {
        self.buffers.iter_mut().for_each(String::clear);
    }
}

impl From<[&str; TRACKED_COORDINATES]> for SampleBuffers {
    fn from(texts: [&str; TRACKED_COORDINATES]) -> Self {
        Self {
            buffers: texts.map(str::to_string),
        }
    }
}
