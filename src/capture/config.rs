//! Sampler and application configuration.
//!
//! The sampler settings decide how long a round takes: every round polls
//! each tracked coordinate `hex_max` times with a fixed pause between
//! reads, so a round blocks for `hex_max * 3 * delay`.

use super::{TrackedCoordinate, TrackedCoords};
use crate::aggregation::Strategy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for one sampling round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Samples taken per coordinate per round.
    pub hex_max: u32,
    /// Pause after every single read, in milliseconds.
    pub delay_ms: u64,
    /// Screen coordinates to poll, in order.
    pub coordinates: Vec<TrackedCoordinate>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            hex_max: 10,
            delay_ms: 300,
            // Coordinates for a 1920 x 1080 screen
            coordinates: vec![
                TrackedCoordinate::new(699, 328),
                TrackedCoordinate::new(915, 328),
                TrackedCoordinate::new(1079, 326),
            ],
        }
    }
}

impl SamplerConfig {
    /// Creates a configuration for the given coordinates.
    pub fn with_coordinates(hex_max: u32, coordinates: Vec<TrackedCoordinate>) -> Self {
        Self {
            hex_max,
            coordinates,
            ..Default::default()
        }
    }

    /// Validates the configuration and returns the tracked coordinates.
    pub fn validate(&self) -> Result<TrackedCoords, ConfigError> {
        if self.hex_max == 0 {
            return Err(ConfigError::InvalidHexMax);
        }
        TrackedCoords::from_slice(&self.coordinates)
    }

    /// Pause after every read.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `hex_max` is zero.
    #[error("hex_max must be greater than 0")]
    InvalidHexMax,
    /// The coordinate list is empty.
    #[error("no tracked coordinate has been set")]
    NoCoordinates,
    /// The coordinate list does not hold exactly three entries.
    #[error("exactly 3 tracked coordinates are required, got {got}")]
    CoordinateCount {
        /// Number of coordinates given.
        got: usize,
    },
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Sampling settings.
    #[serde(default)]
    pub sampler: SamplerConfig,
    /// Aggregation settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,
    /// Output and loop settings.
    #[serde(default)]
    pub output: OutputConfig,
    /// Interactive capture settings.
    #[serde(default)]
    pub pick: PickConfig,
}

/// Aggregation configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AggregationConfig {
    /// How each round is reduced to three colors.
    pub strategy: Strategy,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// PATCH target. Results go to stdout when unset.
    pub url: Option<String>,
    /// Rounds to run, 0 runs until terminated.
    pub rounds: u32,
    /// Pause between rounds, in milliseconds.
    pub round_interval_ms: u64,
    /// Timeout for a single PATCH request, in milliseconds.
    pub request_timeout_ms: u64,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            url: None,
            rounds: 0,
            round_interval_ms: 1000,
            request_timeout_ms: 10_000,
            metrics_port: 0,
        }
    }
}

/// Interactive coordinate capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickConfig {
    /// Upper bound on waiting for three clicks, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for PickConfig {
    fn default() -> Self {
        Self { timeout_ms: 30_000 }
    }
}

impl PickConfig {
    /// Capture timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.sampler.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = SamplerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_zero_hex_max_invalid() {
        let config = SamplerConfig {
            hex_max: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHexMax)));
    }

    #[test]
    fn test_empty_coordinates_invalid() {
        let config = SamplerConfig::with_coordinates(4, Vec::new());
        assert!(matches!(config.validate(), Err(ConfigError::NoCoordinates)));
    }

    #[test]
    fn test_parse_toml() {
        let config = FileConfig::from_toml(
            r#"
            [sampler]
            hex_max = 2
            delay_ms = 50
            coordinates = [{ x = 1, y = 2 }, { x = 3, y = 4 }, { x = 5, y = 6 }]

            [aggregation]
            strategy = "smoothed-quadratic"

            [output]
            url = "http://localhost:8080/colors"
            rounds = 3
            round_interval_ms = 10
            request_timeout_ms = 500
            metrics_port = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.sampler.hex_max, 2);
        assert_eq!(config.sampler.coordinates[2], TrackedCoordinate::new(5, 6));
        assert_eq!(config.aggregation.strategy, Strategy::SmoothedQuadratic);
        assert_eq!(config.output.rounds, 3);
        assert_eq!(config.pick.timeout_ms, 30_000);
    }

    #[test]
    fn test_parse_rejects_two_coordinates() {
        let result = FileConfig::from_toml(
            r#"
            [sampler]
            hex_max = 2
            delay_ms = 50
            coordinates = [{ x = 1, y = 2 }, { x = 3, y = 4 }]
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::CoordinateCount { got: 2 })
        ));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert_eq!(config.sampler, SamplerConfig::default());
        assert_eq!(config.aggregation.strategy, Strategy::Opaque);
        assert!(config.output.url.is_none());
    }
}
