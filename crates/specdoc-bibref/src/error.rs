//! Error types for remote reference lookup.

/// Result type alias for specdoc-bibref operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the reference database.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("reference database request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("reference database is unreachable")]
    ServiceUnavailable,
}
