//! Error types for image configuration.

use thiserror::Error;

/// Errors that can occur while building a Firebird image configuration.
///
/// Resolving the image variant and building the environment never fail;
/// only parsing user-supplied strings does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The image reference could not be parsed.
    #[error("invalid image reference: {0}")]
    InvalidImageReference(String),

    /// The image reference pins a digest, which the container runner cannot pull.
    #[error("image reference {0} uses a digest; use a tag instead")]
    DigestNotSupported(String),

    /// A `jdbc:tc:` URL could not be parsed.
    #[error("invalid jdbc:tc: URL: {0}")]
    InvalidTcUrl(String),

    /// A `jdbc:tc:` URL names a database type this provider does not handle.
    #[error("unsupported database type: {0}")]
    UnsupportedDatabaseType(String),
}
