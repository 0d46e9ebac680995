//! Pipeline error taxonomy.

use crate::aggregation::AggregationError;
use crate::capture::{ConfigError, ProbeError};
use crate::color::{DecodeError, FormatError};
use crate::sink::TransportError;
use thiserror::Error;

/// Failure of a pipeline stage.
///
/// Once stored in a [`PxColorPipe`](super::PxColorPipe) it stays there for
/// the rest of the pipe's life.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Invalid sampler configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The screen probe failed.
    #[error("probe error: {0}")]
    Probe(#[from] ProbeError),

    /// A sample token could not be decoded.
    #[error("decode error for coordinate {coordinate}: {source}")]
    Decode {
        /// Coordinate whose buffer held the token.
        coordinate: usize,
        /// Decoding failure.
        source: DecodeError,
    },

    /// A coordinate had no samples to aggregate.
    #[error("no samples to aggregate for coordinate {coordinate}")]
    EmptyAggregation {
        /// Index of the empty coordinate.
        coordinate: usize,
    },

    /// The stream is not a valid hex triple.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Sending the result failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A stage ran before the stage it depends on.
    #[error("{stage} stage requires a preceding {requires} stage")]
    OutOfOrder {
        /// Stage that was called.
        stage: &'static str,
        /// Stage that must run first.
        requires: &'static str,
    },

    /// Writing the stream failed.
    #[error("output error: {0}")]
    Io(String),
}

impl From<AggregationError> for PipelineError {
    fn from(err: AggregationError) -> Self {
        match err {
            AggregationError::EmptySequence { coordinate } => Self::EmptyAggregation { coordinate },
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_error_maps_to_empty_aggregation() {
        let err = PipelineError::from(AggregationError::EmptySequence { coordinate: 2 });
        assert_eq!(err, PipelineError::EmptyAggregation { coordinate: 2 });
    }

    #[test]
    fn test_display_includes_cause() {
        let err = PipelineError::from(ConfigError::InvalidHexMax);
        assert_eq!(
            err.to_string(),
            "configuration error: hex_max must be greater than 0"
        );
    }
}
