//! Chainable pipeline controller.

use super::{stages, PipelineError};
use crate::aggregation::{AggregateResult, MeanKind, SmoothingAverager, Strategy};
use crate::capture::{SampleBuffers, SamplerConfig, ScreenProbe};
use crate::color::ColorSet;
use crate::sink::{PatchResponse, PatchSink, Sink};
use std::io::Write;

/// Drives one round through the pipeline stages.
///
/// Each stage method checks the error slot first. Once a stage fails, the
/// error is kept and every later stage does nothing except leave an empty
/// stream behind, so a failed round never reaches a sink with partial
/// data. The error slot cannot be cleared; start a new pipe for the next
/// round.
///
/// ```
/// use pxcolor::capture::{MockProbe, SamplerConfig};
/// use pxcolor::pipeline::PxColorPipe;
///
/// let mut probe = MockProbe::new();
/// let mut out = Vec::new();
/// let mut pipe = PxColorPipe::new(SamplerConfig::default());
/// pipe.sample(&mut probe).decode().opacity().to_json().write_to(&mut out);
///
/// assert!(pipe.error().is_none());
/// assert!(out.starts_with(b"{\"first\":"));
/// ```
#[derive(Debug, Default)]
pub struct PxColorPipe {
    config: SamplerConfig,
    buffers: SampleBuffers,
    colors: ColorSet,
    aggregate: Option<AggregateResult>,
    stream: Vec<u8>,
    err: Option<PipelineError>,
}

impl PxColorPipe {
    /// Creates a pipe that samples with `config`.
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Starts from already collected sample buffers.
    pub fn with_buffers(mut self, buffers: SampleBuffers) -> Self {
        self.buffers = buffers;
        self
    }

    /// Starts from already decoded colors.
    pub fn with_colors(mut self, colors: ColorSet) -> Self {
        self.colors = colors;
        self
    }

    /// Starts from an aggregated result.
    pub fn with_aggregate(mut self, aggregate: AggregateResult) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    /// Starts with pending stream content.
    pub fn with_stream(mut self, stream: impl Into<Vec<u8>>) -> Self {
        self.stream = stream.into();
        self
    }

    /// Starts in the failed state.
    pub fn with_error(mut self, err: PipelineError) -> Self {
        self.err = Some(err);
        self
    }

    /// Sampler configuration of this pipe.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Raw sample text not yet decoded.
    pub fn buffers(&self) -> &SampleBuffers {
        &self.buffers
    }

    /// Decoded colors of the round.
    pub fn colors(&self) -> &ColorSet {
        &self.colors
    }

    /// Result of the last aggregation stage, if it succeeded.
    pub fn aggregate(&self) -> Option<&AggregateResult> {
        self.aggregate.as_ref()
    }

    /// Pending stream content.
    pub fn stream(&self) -> &[u8] {
        &self.stream
    }

    /// The first error raised by any stage.
    pub fn error(&self) -> Option<&PipelineError> {
        self.err.as_ref()
    }

    fn fail(&mut self, stage: &'static str, err: PipelineError) {
        tracing::warn!(stage, error = %err, "Pipeline stage failed");
        self.stream.clear();
        self.err = Some(err);
    }

    fn skipped(&mut self, stage: &'static str) -> bool {
        match &self.err {
            Some(err) => {
                tracing::debug!(stage, error = %err, "Skipping stage after earlier failure");
                self.stream.clear();
                true
            }
            None => false,
        }
    }

    /// Polls the configured coordinates into the sample buffers.
    pub fn sample<P: ScreenProbe + ?Sized>(&mut self, probe: &mut P) -> &mut Self {
        if self.skipped("sample") {
            return self;
        }
        if let Err(err) = stages::sample(probe, &self.config, &mut self.buffers) {
            self.fail("sample", err);
        }
        self
    }

    /// Parses the sample buffers into colors and clears them.
    ///
    /// After a failure (earlier or here) the color set is three empty
    /// sequences.
    pub fn decode(&mut self) -> &mut Self {
        if self.skipped("decode") {
            self.colors = ColorSet::default();
            return self;
        }
        match stages::decode(&mut self.buffers) {
            Ok(colors) => self.colors = colors,
            Err(err) => {
                self.colors = ColorSet::default();
                self.fail("decode", err);
            }
        }
        self
    }

    /// Per-round channel mean; writes the hex triple to the stream.
    pub fn average(&mut self, kind: MeanKind) -> &mut Self {
        let result = stages::average(&self.colors, kind);
        self.store_aggregate("average", result)
    }

    /// Smoothed channel mean; writes the hex triple to the stream.
    pub fn smoothed_average(
        &mut self,
        averager: &mut SmoothingAverager,
        kind: MeanKind,
    ) -> &mut Self {
        if self.skipped("smoothed_average") {
            self.aggregate = None;
            return self;
        }
        let result = stages::smoothed_average(averager, &self.colors, kind);
        self.store_aggregate("smoothed_average", result)
    }

    /// Lowest-red selection; writes the hex triple to the stream.
    pub fn opacity(&mut self) -> &mut Self {
        let result = stages::opacity(&self.colors);
        self.store_aggregate("opacity", result)
    }

    /// Runs the aggregation stage selected by `strategy`.
    pub fn aggregate_with(
        &mut self,
        strategy: Strategy,
        averager: &mut SmoothingAverager,
    ) -> &mut Self {
        match (strategy.mean_kind(), strategy.is_smoothed()) {
            (Some(kind), true) => self.smoothed_average(averager, kind),
            (Some(kind), false) => self.average(kind),
            (None, _) => self.opacity(),
        }
    }

    fn store_aggregate(
        &mut self,
        stage: &'static str,
        result: Result<AggregateResult, PipelineError>,
    ) -> &mut Self {
        if self.skipped(stage) {
            self.aggregate = None;
            return self;
        }
        match result {
            Ok(aggregate) => {
                self.stream = stages::encode_hex(&aggregate).into_bytes();
                self.aggregate = Some(aggregate);
            }
            Err(err) => {
                self.aggregate = None;
                self.fail(stage, err);
            }
        }
        self
    }

    /// Re-encodes the current aggregate as the hex triple.
    pub fn to_hex(&mut self) -> &mut Self {
        if self.skipped("hex") {
            return self;
        }
        match self.aggregate {
            Some(aggregate) => self.stream = stages::encode_hex(&aggregate).into_bytes(),
            None => self.fail(
                "hex",
                PipelineError::OutOfOrder {
                    stage: "hex",
                    requires: "aggregation",
                },
            ),
        }
        self
    }

    /// Replaces the hex triple in the stream by its JSON object.
    pub fn to_json(&mut self) -> &mut Self {
        if self.skipped("json") {
            return self;
        }
        let data = std::mem::take(&mut self.stream);
        match stages::encode_json(&data) {
            Ok(json) => self.stream = json,
            Err(err) => self.fail("json", err),
        }
        self
    }

    /// Copies the stream to `out`, consuming it.
    pub fn write_to<W: Write + ?Sized>(&mut self, out: &mut W) -> &mut Self {
        if self.skipped("write") {
            return self;
        }
        let data = std::mem::take(&mut self.stream);
        if let Err(err) = out.write_all(&data).and_then(|()| out.flush()) {
            self.fail("write", err.into());
        }
        self
    }

    /// Sends the stream as a JSON PATCH body, consuming it.
    pub fn patch(&mut self, sink: &PatchSink) -> Result<PatchResponse, PipelineError> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let body = std::mem::take(&mut self.stream);
        sink.send(body).map_err(|err| {
            let err = PipelineError::from(err);
            self.fail("patch", err.clone());
            err
        })
    }

    /// Delivers the stream to `sink`.
    ///
    /// Writers receive the stream followed by a newline. Returns the PATCH
    /// response when the sink is remote.
    pub fn deliver(&mut self, sink: &mut Sink) -> Result<Option<PatchResponse>, PipelineError> {
        match sink {
            Sink::Writer(out) => {
                self.stream.push(b'\n');
                self.write_to(out.as_mut());
                match &self.err {
                    Some(err) => Err(err.clone()),
                    None => Ok(None),
                }
            }
            Sink::Patch(patch) => self.patch(patch).map(Some),
        }
    }

    /// Takes the stream as text.
    pub fn take_string(&mut self) -> Result<String, PipelineError> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        String::from_utf8(std::mem::take(&mut self.stream))
            .map_err(|e| PipelineError::Io(e.to_string()))
    }

    /// Consumes the pipe, returning the stream or the stored error.
    pub fn finish(self) -> Result<Vec<u8>, PipelineError> {
        match self.err {
            Some(err) => Err(err),
            None => Ok(self.stream),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{ConfigError, MockProbe, TrackedCoordinate};
    use crate::color::{FormatError, Rgba};

    fn preset_error() -> PipelineError {
        PipelineError::Io("some non-nil error".to_string())
    }

    fn opaque_set() -> ColorSet {
        ColorSet::new([
            vec![
                Rgba::new(133, 190, 198, 255),
                Rgba::new(100, 170, 180, 255),
                Rgba::new(125, 180, 190, 255),
            ],
            vec![
                Rgba::new(232, 141, 52, 255),
                Rgba::new(212, 121, 32, 255),
                Rgba::new(202, 111, 22, 255),
            ],
            vec![
                Rgba::new(100, 168, 23, 255),
                Rgba::new(130, 178, 33, 255),
                Rgba::new(140, 188, 37, 255),
            ],
        ])
    }

    #[test]
    fn test_write_to_copies_stream() {
        let mut out = Vec::new();
        PxColorPipe::default()
            .with_stream("#34a853")
            .write_to(&mut out);
        assert_eq!(out, b"#34a853");
    }

    #[test]
    fn test_write_to_noops_after_error() {
        let mut out = Vec::new();
        PxColorPipe::default()
            .with_stream("#34a853")
            .with_error(preset_error())
            .write_to(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_sample_invalid_hex_max_sets_error_and_empty_stream() {
        let coords = vec![
            TrackedCoordinate::new(244, 182),
            TrackedCoordinate::new(258, 193),
            TrackedCoordinate::new(240, 206),
        ];
        let mut pipe = PxColorPipe::new(SamplerConfig::with_coordinates(0, coords))
            .with_stream("stale");

        pipe.sample(&mut MockProbe::new());

        assert_eq!(
            pipe.error(),
            Some(&PipelineError::Config(ConfigError::InvalidHexMax))
        );
        assert!(pipe.stream().is_empty());
    }

    #[test]
    fn test_sample_without_coordinates_sets_error() {
        let mut pipe = PxColorPipe::new(SamplerConfig::with_coordinates(4, Vec::new()));
        pipe.sample(&mut MockProbe::new());
        assert_eq!(
            pipe.error(),
            Some(&PipelineError::Config(ConfigError::NoCoordinates))
        );
    }

    #[test]
    fn test_decode_converts_buffers() {
        let mut pipe = PxColorPipe::default()
            .with_buffers(SampleBuffers::from(["#34a853 ", "#fabc05 ", "#e94334 "]));

        pipe.decode();

        assert_eq!(
            pipe.colors(),
            &ColorSet::new([
                vec![Rgba::new(52, 168, 83, 255)],
                vec![Rgba::new(250, 188, 5, 255)],
                vec![Rgba::new(233, 67, 52, 255)],
            ])
        );
        assert_eq!(pipe.buffers().total_len(), 0);
    }

    #[test]
    fn test_decode_noops_after_error() {
        let mut pipe = PxColorPipe::default()
            .with_buffers(SampleBuffers::from(["#34a853 ", "#fabc05 ", "#e94334 "]))
            .with_colors(opaque_set())
            .with_error(preset_error());

        pipe.decode();

        assert_eq!(pipe.colors(), &ColorSet::default());
        assert_eq!(pipe.colors().sequences().len(), 3);
    }

    #[test]
    fn test_decode_bad_token_fails_round() {
        let mut pipe = PxColorPipe::default()
            .with_buffers(SampleBuffers::from(["#34a853 ", "#xyz ", "#e94334 "]));

        pipe.decode().opacity().to_json();

        assert!(matches!(
            pipe.error(),
            Some(PipelineError::Decode { coordinate: 1, .. })
        ));
        assert!(pipe.colors().is_empty());
        assert!(pipe.aggregate().is_none());
        assert!(pipe.stream().is_empty());
    }

    #[test]
    fn test_opacity_selects_most_opaque() {
        let mut pipe = PxColorPipe::default().with_colors(opaque_set());

        pipe.opacity();

        assert_eq!(
            pipe.aggregate(),
            Some(&AggregateResult::Opaque([
                Rgba::new(100, 170, 180, 255),
                Rgba::new(202, 111, 22, 255),
                Rgba::new(100, 168, 23, 255),
            ]))
        );
        assert_eq!(pipe.stream(), b"64aab4 ca6f16 64a817");
    }

    #[test]
    fn test_opacity_noops_after_error() {
        let mut pipe = PxColorPipe::default()
            .with_colors(opaque_set())
            .with_error(preset_error());
        pipe.opacity();
        assert!(pipe.aggregate().is_none());
    }

    #[test]
    fn test_opacity_empty_sequence_fails() {
        let mut pipe = PxColorPipe::default();
        pipe.opacity();
        assert_eq!(
            pipe.error(),
            Some(&PipelineError::EmptyAggregation { coordinate: 0 })
        );
    }

    #[test]
    fn test_to_hex_from_aggregate() {
        let mut pipe = PxColorPipe::default()
            .with_stream(" ")
            .with_aggregate(AggregateResult::Opaque([
                Rgba::new(100, 170, 180, 255),
                Rgba::new(202, 111, 22, 255),
                Rgba::new(100, 168, 23, 255),
            ]));

        pipe.to_hex();

        assert_eq!(pipe.take_string().unwrap(), "64aab4 ca6f16 64a817");
    }

    #[test]
    fn test_to_hex_without_aggregate_is_out_of_order() {
        let mut pipe = PxColorPipe::default();
        pipe.to_hex();
        assert!(matches!(
            pipe.error(),
            Some(PipelineError::OutOfOrder { stage: "hex", .. })
        ));
    }

    #[test]
    fn test_to_hex_noops_after_error() {
        let mut pipe = PxColorPipe::default().with_error(preset_error());
        pipe.to_hex();
        assert!(pipe.stream().is_empty());
    }

    #[test]
    fn test_average_is_idempotent() {
        let white = Rgba::opaque(255, 255, 255);
        let set = ColorSet::new([vec![white; 2], vec![white; 2], vec![white; 2]]);
        let mut pipe = PxColorPipe::default().with_colors(set);

        let first = *pipe.average(MeanKind::Arithmetic).aggregate().unwrap();
        let second = *pipe.average(MeanKind::Arithmetic).aggregate().unwrap();

        assert_eq!(first, second);
        assert_eq!(first, AggregateResult::Average([white; 3]));
    }

    #[test]
    fn test_to_json() {
        let mut pipe = PxColorPipe::default().with_stream("b28d2f b6482d c0660f");
        pipe.to_json();
        assert_eq!(
            pipe.take_string().unwrap(),
            r#"{"first":"b28d2f","second":"b6482d","third":"c0660f"}"#
        );
    }

    #[test]
    fn test_to_json_noops_after_error() {
        let mut pipe = PxColorPipe::default()
            .with_stream("b28d2f b6482d c0660f")
            .with_error(preset_error());
        pipe.to_json();
        assert!(pipe.stream().is_empty());
    }

    #[test]
    fn test_to_json_rejects_wrong_length() {
        let mut pipe = PxColorPipe::default().with_stream("b28d2f b6482d ");
        pipe.to_json();
        assert!(pipe.stream().is_empty());
        assert_eq!(
            pipe.error(),
            Some(&PipelineError::Format(FormatError::InvalidLength { len: 14 }))
        );
    }

    #[test]
    fn test_take_string() {
        let mut pipe = PxColorPipe::default().with_stream("b28d2f b6482d c0660f");
        assert_eq!(pipe.take_string().unwrap(), "b28d2f b6482d c0660f");
    }

    #[test]
    fn test_take_string_error() {
        let mut pipe = PxColorPipe::default().with_error(preset_error());
        assert!(pipe.take_string().is_err());
    }

    #[test]
    fn test_error_is_sticky() {
        let mut pipe = PxColorPipe::default().with_stream("short");
        pipe.to_json();
        let first = pipe.error().cloned();

        pipe.with_stream_for_test("b28d2f b6482d c0660f").to_json();

        assert_eq!(pipe.error().cloned(), first);
        assert!(pipe.finish().is_err());
    }

    #[test]
    fn test_smoothed_average_uses_caller_state() {
        let mut averager = SmoothingAverager::default();
        let dark = Rgba::opaque(0, 0, 0);
        let light = Rgba::opaque(100, 100, 100);

        PxColorPipe::default()
            .with_colors(ColorSet::new([vec![dark], vec![dark], vec![dark]]))
            .smoothed_average(&mut averager, MeanKind::Arithmetic);
        let mut pipe = PxColorPipe::default()
            .with_colors(ColorSet::new([vec![light], vec![light], vec![light]]));
        pipe.smoothed_average(&mut averager, MeanKind::Arithmetic);

        assert_eq!(pipe.take_string().unwrap(), "323232 323232 323232");
    }

    #[test]
    fn test_deliver_to_writer_appends_newline() {
        struct Shared(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);
        impl Write for Shared {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let written = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut pipe = PxColorPipe::default().with_stream("b28d2f b6482d c0660f");
        let mut sink = Sink::Writer(Box::new(Shared(written.clone())));

        assert_eq!(pipe.deliver(&mut sink), Ok(None));
        assert_eq!(written.lock().unwrap().as_slice(), b"b28d2f b6482d c0660f\n");
        assert!(pipe.stream().is_empty());
    }

    impl PxColorPipe {
        fn with_stream_for_test(&mut self, stream: &str) -> &mut Self {
            self.stream = stream.as_bytes().to_vec();
            self
        }
    }
}
