use thiserror::Error;

/// Errors that can occur during an acquisition cycle.
///
/// Each variant tags the lifecycle step that failed, so callers can tell a
/// board that refused to connect apart from one that died mid-stream or
/// could not be released.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    #[error("stream failure: {0}")]
    StreamFailure(String),

    #[error("retrieval failure: {0}")]
    RetrievalFailure(String),

    #[error("release failure: {0}")]
    ReleaseFailure(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("an acquisition cycle is already in progress")]
    CycleInProgress,
}
