//! The three-color hex triple exchanged on the wire.

use super::{DecodeError, Rgba};
use crate::capture::TRACKED_COORDINATES;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Byte length of the space-joined triple `"rrggbb rrggbb rrggbb"`.
pub const TRI_HEX_LEN: usize = 20;

const HEX_DIGITS: usize = 6;

/// Errors produced while reading a space-joined hex triple.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The input is not exactly 20 bytes.
    #[error("length of input is invalid ({len} bytes). Must be of length 20")]
    InvalidLength {
        /// Actual input length.
        len: usize,
    },
    /// A separator byte is not a space.
    #[error("expected a single space separator at byte {offset}")]
    InvalidSeparator {
        /// Byte offset of the separator.
        offset: usize,
    },
    /// A field is not six hex digits.
    #[error("field {field} is not six hexadecimal digits")]
    InvalidField {
        /// Field index, 0 to 2.
        field: usize,
    },
    /// JSON serialization failed.
    #[error("failed to serialize colors: {0}")]
    Serialize(String),
}

/// Three representative colors as six-digit lowercase hex strings.
///
/// Field names are part of the wire contract:
/// `{"first":"b28d2f","second":"b6482d","third":"c0660f"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriHexColor {
    /// Color of the first coordinate.
    pub first: String,
    /// Color of the second coordinate.
    pub second: String,
    /// Color of the third coordinate.
    pub third: String,
}

impl TriHexColor {
    /// Builds the triple from colors in coordinate order.
    pub fn from_colors(colors: &[Rgba; TRACKED_COORDINATES]) -> Self {
        Self {
            first: colors[0].to_hex(),
            second: colors[1].to_hex(),
            third: colors[2].to_hex(),
        }
    }

    /// Parses the fixed 20-byte layout `rrggbb rrggbb rrggbb`.
    pub fn parse(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() != TRI_HEX_LEN {
            return Err(FormatError::InvalidLength { len: data.len() });
        }

        for offset in [HEX_DIGITS, 2 * HEX_DIGITS + 1] {
            if data[offset] != b' ' {
                return Err(FormatError::InvalidSeparator { offset });
            }
        }

        let field = |index: usize| {
            let start = index * (HEX_DIGITS + 1);
            let bytes = &data[start..start + HEX_DIGITS];
            if !bytes.iter().all(u8::is_ascii_hexdigit) {
                return Err(FormatError::InvalidField { field: index });
            }
            // all bytes are ASCII hex digits at this point
            Ok(bytes
                .iter()
                .map(|b| char::from(b.to_ascii_lowercase()))
                .collect::<String>())
        };

        Ok(Self {
            first: field(0)?,
            second: field(1)?,
            third: field(2)?,
        })
    }

    /// Serializes the triple as compact JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, FormatError> {
        serde_json::to_vec(self).map_err(|e| FormatError::Serialize(e.to_string()))
    }

    /// Decodes each field back into a color.
    pub fn colors(&self) -> Result<[Rgba; TRACKED_COORDINATES], DecodeError> {
        let decode = |hex: &str| Rgba::from_hex_token(&format!("#{hex}"));
        Ok([
            decode(&self.first)?,
            decode(&self.second)?,
            decode(&self.third)?,
        ])
    }
}

impl fmt::Display for TriHexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.first, self.second, self.third)
    }
}

/// Formats three colors as the space-joined hex triple.
pub fn encode_hex(colors: &[Rgba; TRACKED_COORDINATES]) -> String {
    TriHexColor::from_colors(colors).to_string()
}
