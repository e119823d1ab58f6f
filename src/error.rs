use thiserror::Error;

/// Failures raised by the snowflake ID allocator.
#[derive(Debug, Error)]
pub enum IdError {
    /// The system clock moved backward relative to the last successful
    /// allocation. The in-flight allocation fails; whether to retry after
    /// waiting is the caller's decision.
    #[error(
        "clock moved backwards: last allocation at {last_ms} ms, observed {observed_ms} ms"
    )]
    ClockRegression { last_ms: i64, observed_ms: i64 },

    #[error("{field} {value} exceeds the 5-bit maximum of 31")]
    IdentityOutOfRange { field: &'static str, value: u64 },
}

/// Structural rejection of a heading batch. Any of these aborts the whole
/// document's segmentation; a partially numbered tree is never returned.
#[derive(Debug, Error)]
pub enum HeadingError {
    #[error("heading at paragraph {position} has level 0; levels start at 1")]
    LevelOutOfRange { position: usize },

    #[error(
        "heading positions must strictly increase in document order: \
         {previous} followed by {position}"
    )]
    NonMonotonicPosition { previous: usize, position: usize },
}

/// Failure in the segment row store, kept distinct from structural errors.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("segment store failure: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("segment table payload encoding failure: {0}")]
    Encoding(#[from] serde_json::Error),
}
