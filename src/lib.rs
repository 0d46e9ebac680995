//! Pixel Color Sampling Library
//!
//! Samples pixel colors at three fixed screen coordinates over repeated
//! polling rounds, reduces each coordinate's samples to one representative
//! color, and publishes the result as a hex triple or its JSON form.
//!
//! # Architecture
//!
//! ```text
//! capture (probe → buffers) → color (decode) → aggregation → color (hex/JSON) → sink
//!                     └──────────── pipeline (stages + controller) ───────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Stop on first failure**: a failed stage turns every later stage into
//!   a no-op, so no partial payload ever reaches a sink
//! - **No hidden state**: per-round aggregation is idempotent; smoothing
//!   across rounds needs an explicit [`SmoothingAverager`]
//! - **Collaborators behind traits**: screen probing, click capture and
//!   process control are interfaces with mock or std implementations
//!
//! # Example
//!
//! ```
//! use pxcolor::{
//!     capture::{MockProbe, SamplerConfig},
//!     pipeline::PxColorPipe,
//! };
//!
//! let mut probe = MockProbe::new();
//! let mut pipe = PxColorPipe::new(SamplerConfig::default());
//!
//! let hex = pipe
//!     .sample(&mut probe)
//!     .decode()
//!     .opacity()
//!     .take_string()
//!     .unwrap();
//!
//! assert_eq!(hex.len(), pxcolor::color::TRI_HEX_LEN);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod aggregation;
pub mod capture;
pub mod color;
pub mod metrics;
pub mod pipeline;
pub mod process;
pub mod sink;

// Re-export commonly used types at crate root
pub use aggregation::{AggregateResult, MeanKind, SmoothingAverager, Strategy};
pub use capture::{MockProbe, SampleBuffers, SamplerConfig, ScreenProbe, TrackedCoordinate};
pub use color::{ColorSet, Rgba, TriHexColor};
pub use pipeline::{PipelineError, PxColorPipe};
pub use sink::{PatchSink, Sink};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
