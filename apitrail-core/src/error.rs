use thiserror::Error;

/// Unified error type for apitrail internals.
///
/// None of these variants ever reach the API caller — every internal fault
/// is caught at its point of origin and degrades the record instead of the
/// request.
#[derive(Error, Debug)]
pub enum TrailError {
    #[error("Store rejected record: {0}")]
    Store(String),

    #[error("Response rendering failed: {0}")]
    Render(String),

    #[error("Handler resolution failed: {0}")]
    Resolution(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
