//! Screen sampling inputs.
//!
//! This module provides the tracked coordinates, the screen probe
//! abstraction used to read pixel colors, the per-coordinate sample
//! buffers, and the sampler configuration. The probe is treated as an
//! external capability; only its interface lives here, plus a mock for
//! testing and demonstration.

mod buffer;
mod config;
mod coords;
mod pick;
mod probe;

pub use buffer::SampleBuffers;
pub use config::{
    AggregationConfig, ConfigError, FileConfig, OutputConfig, PickConfig, SamplerConfig,
};
pub use coords::{TrackedCoordinate, TrackedCoords, TRACKED_COORDINATES};
pub use pick::{parse_click, CaptureError, ChannelCapture, CoordinateCapture};
pub use probe::{MockProbe, ProbeError, ScreenProbe};
