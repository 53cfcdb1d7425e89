use thiserror::Error;

/// Failures reported by a [`KeyValueStore`](crate::store::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    #[error("storage read failed: {0}")]
    ReadFailed(String),

    #[error("storage write rejected: {0}")]
    WriteRejected(String),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("no persistence store configured")]
    NoStore,

    #[error("failed to (de)serialize timers: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum WidgetStateError {
    #[error("Missing widgetId")]
    MissingWidgetId,

    #[error("unknown widget kind: {0}")]
    UnknownKind(String),

    #[error("stored widget state is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("Duration cannot be empty")]
    EmptyInput,

    #[error("Invalid duration format. {0}")]
    InvalidFormat(String),

    #[error("Invalid minutes: {0} (must be 0-59)")]
    InvalidMinutes(u32),

    #[error("Invalid seconds: {0} (must be 0-59)")]
    InvalidSeconds(u32),
}
