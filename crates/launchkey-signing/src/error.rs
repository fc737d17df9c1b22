//! Error types for keystore properties loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for signing operations
pub type Result<T> = std::result::Result<T, SigningError>;

/// Errors raised while loading signing credentials.
///
/// These never escape the resolver; they are turned into a debug fallback.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The properties file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The properties file is not valid UTF-8
    #[error("{path} is not valid UTF-8 (line {line})")]
    InvalidEncoding { path: PathBuf, line: usize },

    /// A `\uXXXX` escape is truncated or not hexadecimal
    #[error("Malformed \\uXXXX escape in {path} at line {line}")]
    MalformedEscape { path: PathBuf, line: usize },
}
