//! RGBA color value and hex token codec.

use std::fmt;
use thiserror::Error;

/// Errors produced while decoding a hex color token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The token does not start with `#`.
    #[error("hex token {token:?} is missing the '#' prefix")]
    MissingPrefix {
        /// Offending token.
        token: String,
    },
    /// The token has neither 3 nor 6 digits.
    #[error("hex token {token:?} has {len} digits, expected 3 or 6")]
    InvalidLength {
        /// Offending token.
        token: String,
        /// Number of digits after `#`.
        len: usize,
    },
    /// A digit is outside `0-9a-fA-F`.
    #[error("hex token {token:?} contains a non-hexadecimal digit")]
    InvalidDigit {
        /// Offending token.
        token: String,
    },
}

/// An 8-bit per channel color.
///
/// Alpha is never sampled. Every color produced by decoding or aggregation
/// is fully opaque (`a == 255`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    /// Alpha value assigned to every decoded or aggregated color.
    pub const OPAQUE: u8 = 255;

    /// Creates a color from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, Self::OPAQUE)
    }

    /// Parses a `#rgb` or `#rrggbb` token. Alpha is forced to 255.
    pub fn from_hex_token(token: &str) -> Result<Self, DecodeError> {
        let digits = token
            .strip_prefix('#')
            .ok_or_else(|| DecodeError::MissingPrefix {
                token: token.to_string(),
            })?;

        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DecodeError::InvalidDigit {
                token: token.to_string(),
            });
        }

        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| DecodeError::InvalidDigit {
                token: token.to_string(),
            })
        };

        match digits.len() {
            6 => Ok(Self::opaque(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            // #rgb shorthand: each nibble is doubled (0xa -> 0xaa)
            3 => Ok(Self::opaque(
                channel(&digits[0..1])? * 0x11,
                channel(&digits[1..2])? * 0x11,
                channel(&digits[2..3])? * 0x11,
            )),
            len => Err(DecodeError::InvalidLength {
                token: token.to_string(),
                len,
            }),
        }
    }

    /// Formats the color channels as six lowercase hex digits, no prefix.
    pub fn to_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}
