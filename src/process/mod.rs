//! Launching and stopping the application whose pixels are sampled.
//!
//! Process control is an external capability. The pipeline never uses it;
//! the CLI starts the target before sampling and can kill it on exit.

mod spawned;

pub use spawned::{kill_by_name, ProcessControl, ProcessError, SpawnedProcesses};
