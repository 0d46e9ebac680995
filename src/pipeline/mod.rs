//! The sampling to aggregation to encoding chain.
//!
//! Stages are plain functions returning `Result` ([`stages`]), so callers
//! can compose them with `?`. [`PxColorPipe`] wraps the same stages in a
//! chainable controller that keeps intermediate state between calls and
//! stops doing work after the first failure.
//!
//! ```text
//! sample → decode → average | smoothed_average | opacity → to_hex → to_json → write_to | patch
//! ```

mod controller;
mod error;
pub mod stages;

pub use controller::PxColorPipe;
pub use error::PipelineError;
