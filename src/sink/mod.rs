//! Destinations for encoded results.
//!
//! A round's output either goes to a local writer (stdout in the CLI) or is
//! sent as an HTTP PATCH to a configured endpoint.

mod http;

pub use http::{PatchResponse, PatchSink, TransportError};

use std::io::Write;

/// Where the pipeline delivers its final stream.
pub enum Sink {
    /// Copies the stream verbatim, followed by a newline.
    Writer(Box<dyn Write + Send>),
    /// Sends the stream as a JSON PATCH body.
    Patch(PatchSink),
}

impl Sink {
    /// Writes to standard output.
    pub fn stdout() -> Self {
        Self::Writer(Box::new(std::io::stdout()))
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Writer(_) => "writer".to_string(),
            Self::Patch(patch) => format!("PATCH {}", patch.url()),
        }
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Sink").field(&self.describe()).finish()
    }
}
