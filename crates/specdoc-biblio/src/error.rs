//! Error types for citation resolution.

use std::fmt;

/// Result type alias for specdoc-biblio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during citation resolution.
///
/// Only a structurally invalid local override table aborts a resolution
/// pass. Alias cycles fail the affected key alone; the resolver reports
/// the key as unresolved and continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An `aliasOf` chain revisited a key or ran past the hop limit.
    AliasCycle {
        /// The followed chain, starting at the key as cited.
        chain: Vec<String>,
    },

    /// A local override record is structurally invalid.
    MalformedOverride { key: String, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AliasCycle { chain } => {
                let start = chain.first().map(String::as_str).unwrap_or("?");
                write!(
                    f,
                    "alias chain for '{}' does not terminate: {}",
                    start,
                    chain.join(" -> ")
                )
            }
            Error::MalformedOverride { key, message } => {
                write!(f, "malformed local override for '{}': {}", key, message)
            }
        }
    }
}

impl std::error::Error for Error {}
