use thiserror::Error;

/// Errors surfaced by the core storage and eviction engine.
///
/// The core never panics on user input; every fallible operation returns
/// one of these variants instead.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("bulk is full")]
    BulkFull,

    #[error("failed to read from the OS random source: {0}")]
    RandomSource(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("I/O error: {0}")]
    Io(String),
}
