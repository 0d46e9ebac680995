//! Process control over children spawned by this process.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use thiserror::Error;

/// Errors that can occur while controlling processes.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be started.
    #[error("failed to launch {path:?}: {source}")]
    Launch {
        /// Program path.
        path: PathBuf,
        /// Spawn failure.
        source: std::io::Error,
    },
    /// No tracked process has the given name.
    #[error("no pid was found for {0:?}")]
    NotFound(String),
    /// The pid does not belong to a tracked process.
    #[error("unknown pid {0}")]
    UnknownPid(u32),
    /// Killing or reaping the process failed.
    #[error("failed to kill pid {pid}: {source}")]
    Kill {
        /// Target pid.
        pid: u32,
        /// Kill failure.
        source: std::io::Error,
    },
}

/// Capability to start, find and stop processes.
pub trait ProcessControl {
    /// Starts the program at `path` and returns its pid.
    fn launch(&mut self, path: &Path) -> Result<u32, ProcessError>;

    /// Returns the pids of running processes whose executable is `name`.
    fn find_by_name(&mut self, name: &str) -> Vec<u32>;

    /// Terminates the process with `pid`.
    fn kill(&mut self, pid: u32) -> Result<(), ProcessError>;
}

/// Kills the first process named `name`.
pub fn kill_by_name<C: ProcessControl + ?Sized>(
    control: &mut C,
    name: &str,
) -> Result<u32, ProcessError> {
    let pid = control
        .find_by_name(name)
        .first()
        .copied()
        .ok_or_else(|| ProcessError::NotFound(name.to_string()))?;
    control.kill(pid)?;
    tracing::info!(pid, name, "Process killed");
    Ok(pid)
}

/// Controls the children this process launched itself.
///
/// Names are matched case-insensitively against the executable file name,
/// so `HD-Player.exe` matches `hd-player.exe`.
#[derive(Debug, Default)]
pub struct SpawnedProcesses {
    children: Vec<(String, Child)>,
}

impl SpawnedProcesses {
    /// Creates a tracker with no children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of children still tracked.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if no child is tracked.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl ProcessControl for SpawnedProcesses {
    fn launch(&mut self, path: &Path) -> Result<u32, ProcessError> {
        let child = Command::new(path)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| ProcessError::Launch {
                path: path.to_path_buf(),
                source,
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let pid = child.id();
        tracing::info!(pid, path = %path.display(), "Process launched");

        self.children.push((name, child));
        Ok(pid)
    }

    fn find_by_name(&mut self, name: &str) -> Vec<u32> {
        // drop children that already exited
        self.children
            .retain_mut(|(_, child)| matches!(child.try_wait(), Ok(None)));
        self.children
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, child)| child.id())
            .collect()
    }

    fn kill(&mut self, pid: u32) -> Result<(), ProcessError> {
        let index = self
            .children
            .iter()
            .position(|(_, child)| child.id() == pid)
            .ok_or(ProcessError::UnknownPid(pid))?;
        let (_, mut child) = self.children.remove(index);
        child
            .kill()
            .and_then(|()| child.wait().map(drop))
            .map_err(|source| ProcessError::Kill { pid, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_missing_program_fails() {
        let mut processes = SpawnedProcesses::new();
        let result = processes.launch(Path::new("/nonexistent/Bogus.exe"));
        assert!(matches!(result, Err(ProcessError::Launch { .. })));
        assert!(processes.is_empty());
    }

    #[test]
    fn test_kill_by_name_without_match() {
        let mut processes = SpawnedProcesses::new();
        let result = kill_by_name(&mut processes, "hd-player.exe");
        assert!(matches!(result, Err(ProcessError::NotFound(_))));
    }

    #[test]
    fn test_kill_unknown_pid() {
        let mut processes = SpawnedProcesses::new();
        assert!(matches!(
            processes.kill(424242),
            Err(ProcessError::UnknownPid(424242))
        ));
    }
}
