//! Prometheus metrics for sampling rounds.
//!
//! # Metrics Exposed
//!
//! - `pxcolor_rounds_total` - Rounds attempted
//! - `pxcolor_rounds_failed_total` - Rounds that ended with a pipeline error
//! - `pxcolor_samples_total` - Pixel samples taken
//! - `pxcolor_last_round_timestamp_seconds` - Unix time of the last finished round
//! - `pxcolor_last_color{coordinate, channel}` - Channels of the last published colors
//!
//! # Example
//!
//! ```no_run
//! use pxcolor::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     rounds: 3,
//!     rounds_failed: 1,
//!     samples: 90,
//!     last_round_at: Some(chrono::Utc::now()),
//!     last_colors: None,
//! };
//!
//! registry.update(&snapshot);
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};
