use std::path::PathBuf;
use std::time::Duration;

/// Errors raised at the boundary with the `rac` utility and the filesystem.
#[derive(Debug, thiserror::Error)]
pub enum RacError {
    #[error("rac utility not found: {}", .0.display())]
    MissingUtility(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to spawn rac: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("rac timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("rac exited with status {code}: {stderr}")]
    ExitStatus { code: i32, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = RacError> = std::result::Result<T, E>;
