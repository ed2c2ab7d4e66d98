use std::fmt;

/// Errors that can occur while setting up or driving a PTY session
#[derive(Debug)]
pub enum PtyError {
    /// Failed to allocate the PTY pair
    OpenFailed(String),
    /// Failed to spawn the shell on the subordinate side
    SpawnFailed(String),
    /// Failed to write to the PTY master
    WriteFailed(String),
}

impl fmt::Display for PtyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PtyError::OpenFailed(msg) => write!(f, "Failed to open PTY: {}", msg),
            PtyError::SpawnFailed(msg) => write!(f, "Failed to spawn shell: {}", msg),
            PtyError::WriteFailed(msg) => write!(f, "Failed to write to PTY: {}", msg),
        }
    }
}

impl std::error::Error for PtyError {}

impl From<anyhow::Error> for PtyError {
    fn from(err: anyhow::Error) -> Self {
        PtyError::OpenFailed(err.to_string())
    }
}
