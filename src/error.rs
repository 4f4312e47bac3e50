use thiserror::Error;

/// Errors raised by editing-session gestures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A drag or lasso must be committed or cancelled first
    #[error("cannot start a new gesture while {active} is in progress")]
    InteractionInProgress { active: &'static str },

    /// An update/end/cancel arrived with no matching gesture open
    #[error("no {expected} in progress")]
    NoActiveInteraction { expected: &'static str },

    /// None of the ids passed to a drag are in the registry
    #[error("none of the requested symbols can be dragged")]
    NothingToDrag,

    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),
}

/// Errors from (de)serializing durable documents
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to (de)serialize: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported schema version {found} (supported: {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },
}

/// Errors from loading an editor configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("grid size must be positive, got {0}")]
    InvalidGridSize(f32),

    #[error("history capacity must be at least 1")]
    ZeroHistoryCapacity,

    #[error("duplicate offset must not be zero")]
    ZeroDuplicateOffset,
}
