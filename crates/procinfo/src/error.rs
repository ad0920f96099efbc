use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcInfoError {
    #[error("failed to snapshot process table: {0}")]
    Snapshot(String),

    #[error("window API unavailable: {0}")]
    WindowApiUnavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
