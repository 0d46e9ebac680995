//! Metrics collection and registry.

use crate::capture::TRACKED_COORDINATES;
use crate::color::Rgba;
use chrono::{DateTime, Utc};
use prometheus::{Encoder, IntCounter, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;

const COORDINATE_LABELS: [&str; TRACKED_COORDINATES] = ["first", "second", "third"];

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of the sampling loop for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Rounds attempted.
    pub rounds: u64,
    /// Rounds that failed.
    pub rounds_failed: u64,
    /// Pixel samples taken.
    pub samples: u64,
    /// When the last round finished.
    pub last_round_at: Option<DateTime<Utc>>,
    /// Colors published by the last successful round.
    pub last_colors: Option<[Rgba; TRACKED_COORDINATES]>,
}

impl MetricsSnapshot {
    /// Records a finished round.
    pub fn record_round(
        &mut self,
        samples: u64,
        colors: Option<[Rgba; TRACKED_COORDINATES]>,
        at: DateTime<Utc>,
    ) {
        self.rounds += 1;
        self.samples += samples;
        self.last_round_at = Some(at);
        match colors {
            Some(colors) => self.last_colors = Some(colors),
            None => self.rounds_failed += 1,
        }
    }
}

/// Prometheus metrics registry for the sampling loop.
pub struct MetricsRegistry {
    registry: Registry,
    rounds_total: IntCounter,
    rounds_failed_total: IntCounter,
    samples_total: IntCounter,
    last_round_timestamp: IntGauge,
    last_color: IntGaugeVec,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let rounds_total = IntCounter::new("pxcolor_rounds_total", "Sampling rounds attempted")?;
        let rounds_failed_total = IntCounter::new(
            "pxcolor_rounds_failed_total",
            "Sampling rounds that ended with a pipeline error",
        )?;
        let samples_total = IntCounter::new("pxcolor_samples_total", "Pixel samples taken")?;
        let last_round_timestamp = IntGauge::new(
            "pxcolor_last_round_timestamp_seconds",
            "Unix time of the last finished round",
        )?;
        let last_color = IntGaugeVec::new(
            Opts::new("pxcolor_last_color", "Channel values of the last published colors"),
            &["coordinate", "channel"],
        )?;

        registry.register(Box::new(rounds_total.clone()))?;
        registry.register(Box::new(rounds_failed_total.clone()))?;
        registry.register(Box::new(samples_total.clone()))?;
        registry.register(Box::new(last_round_timestamp.clone()))?;
        registry.register(Box::new(last_color.clone()))?;

        Ok(Self {
            registry,
            rounds_total,
            rounds_failed_total,
            samples_total,
            last_round_timestamp,
            last_color,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // For counters, we need to increment by the difference
        let advance = |counter: &IntCounter, target: u64| {
            let current = counter.get();
            if target > current {
                counter.inc_by(target - current);
            }
        };
        advance(&self.rounds_total, snapshot.rounds);
        advance(&self.rounds_failed_total, snapshot.rounds_failed);
        advance(&self.samples_total, snapshot.samples);

        if let Some(at) = snapshot.last_round_at {
            self.last_round_timestamp.set(at.timestamp());
        }

        if let Some(colors) = snapshot.last_colors {
            for (label, color) in COORDINATE_LABELS.iter().zip(colors) {
                for (channel, value) in [("r", color.r), ("g", color.g), ("b", color.b)] {
                    self.last_color
                        .with_label_values(&[*label, channel])
                        .set(i64::from(value));
                }
            }
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_record_round() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut snapshot = MetricsSnapshot::default();

        snapshot.record_round(30, Some([Rgba::opaque(1, 2, 3); 3]), at);
        snapshot.record_round(0, None, at);

        assert_eq!(snapshot.rounds, 2);
        assert_eq!(snapshot.rounds_failed, 1);
        assert_eq!(snapshot.samples, 30);
        assert_eq!(snapshot.last_colors, Some([Rgba::opaque(1, 2, 3); 3]));
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();
        let snapshot = MetricsSnapshot {
            rounds: 4,
            rounds_failed: 1,
            samples: 90,
            last_round_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            last_colors: Some([
                Rgba::opaque(100, 170, 180),
                Rgba::opaque(202, 111, 22),
                Rgba::opaque(100, 168, 23),
            ]),
        };

        registry.update(&snapshot);
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("pxcolor_rounds_total 4"));
        assert!(output.contains("pxcolor_rounds_failed_total 1"));
        assert!(output.contains("pxcolor_samples_total 90"));
        assert!(output.contains("pxcolor_last_round_timestamp_seconds 1704067200"));
        assert!(output.contains(r#"pxcolor_last_color{channel="r",coordinate="second"} 202"#));
    }
}
