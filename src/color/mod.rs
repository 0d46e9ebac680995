//! Color values and their textual encodings.
//!
//! Probes report colors as `#rrggbb` tokens. This module turns those tokens
//! into structured [`Rgba`] values, groups them per tracked coordinate in a
//! [`ColorSet`], and formats aggregated results back into the
//! `"rrggbb rrggbb rrggbb"` triple and its JSON form ([`TriHexColor`]).

mod rgba;
mod set;
mod tri_hex;

pub use rgba::{DecodeError, Rgba};
pub use set::ColorSet;
pub use tri_hex::{encode_hex, FormatError, TriHexColor, TRI_HEX_LEN};
