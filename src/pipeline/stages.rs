//! Pipeline stages as standalone functions.
//!
//! Every stage takes its input explicitly and returns its output or a
//! [`PipelineError`]. None of them keep state between calls except
//! [`smoothed_average`], whose accumulator is owned by the caller.

use super::PipelineError;
use crate::aggregation::{self, AggregateResult, MeanKind, SmoothingAverager, Strategy};
use crate::capture::{SampleBuffers, SamplerConfig, ScreenProbe};
use crate::color::{self, ColorSet, TriHexColor};

/// Polls every tracked coordinate `hex_max` times into `buffers`.
///
/// The configuration is validated before the probe is touched. If the
/// probe fails part way, the buffers are cleared so no partial round is
/// left behind. Returns the number of samples taken.
pub fn sample<P: ScreenProbe + ?Sized>(
    probe: &mut P,
    config: &SamplerConfig,
    buffers: &mut SampleBuffers,
) -> Result<usize, PipelineError> {
    let coords = config.validate()?;
    let delay = config.delay();
    let mut taken = 0;

    for round in 0..config.hex_max {
        for (index, &coord) in coords.iter().enumerate() {
            let hex = match probe.move_to(coord).and_then(|()| probe.read_color()) {
                Ok(hex) => hex,
                Err(e) => {
                    buffers.clear();
                    return Err(e.into());
                }
            };
            tracing::trace!(round, index, %coord, hex = %hex, "Sampled pixel");
            buffers.push(index, &hex);
            probe.wait(delay);
            taken += 1;
        }
    }

    tracing::debug!(samples = taken, "Sampling complete");
    Ok(taken)
}

/// Parses and clears the sample buffers.
pub fn decode(buffers: &mut SampleBuffers) -> Result<ColorSet, PipelineError> {
    let set = ColorSet::drain_from(buffers)
        .map_err(|(coordinate, source)| PipelineError::Decode { coordinate, source })?;
    tracing::debug!(samples = set.total_samples(), "Decoded samples");
    Ok(set)
}

/// Per-round channel mean.
pub fn average(set: &ColorSet, kind: MeanKind) -> Result<AggregateResult, PipelineError> {
    Ok(AggregateResult::Average(aggregation::mean_colors(set, kind)?))
}

/// Channel mean over every round pushed into `averager`.
pub fn smoothed_average(
    averager: &mut SmoothingAverager,
    set: &ColorSet,
    kind: MeanKind,
) -> Result<AggregateResult, PipelineError> {
    Ok(AggregateResult::Average(averager.push(set, kind)?))
}

/// Lowest-red selection.
pub fn opacity(set: &ColorSet) -> Result<AggregateResult, PipelineError> {
    Ok(AggregateResult::Opaque(aggregation::most_opaque(set)?))
}

/// Dispatches to the stage selected by `strategy`.
pub fn aggregate(
    strategy: Strategy,
    averager: &mut SmoothingAverager,
    set: &ColorSet,
) -> Result<AggregateResult, PipelineError> {
    match (strategy.mean_kind(), strategy.is_smoothed()) {
        (Some(kind), true) => smoothed_average(averager, set, kind),
        (Some(kind), false) => average(set, kind),
        (None, _) => opacity(set),
    }
}

/// Formats the representative colors as `"rrggbb rrggbb rrggbb"`.
pub fn encode_hex(result: &AggregateResult) -> String {
    color::encode_hex(result.colors())
}

/// Converts a space-joined hex triple into its JSON object.
pub fn encode_json(stream: &[u8]) -> Result<Vec<u8>, PipelineError> {
    Ok(TriHexColor::parse(stream)?.to_json()?)
}

/// Runs one full round and returns the wire triple.
pub fn run_round<P: ScreenProbe + ?Sized>(
    probe: &mut P,
    config: &SamplerConfig,
    strategy: Strategy,
    averager: &mut SmoothingAverager,
) -> Result<TriHexColor, PipelineError> {
    let mut buffers = SampleBuffers::new();
    sample(probe, config, &mut buffers)?;
    let set = decode(&mut buffers)?;
    let result = aggregate(strategy, averager, &set)?;
    Ok(TriHexColor::from_colors(result.colors()))
}
