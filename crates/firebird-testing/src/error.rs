//! Container error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running a Firebird container.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid image or URL configuration.
    #[error("configuration error: {0}")]
    Image(#[from] firebird_image::Error),

    /// The container framework failed (pull, create, start, port lookup).
    #[error("container error: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    /// A command run inside the container failed.
    #[error("exec failed: {0}")]
    Exec(String),

    /// The server did not start listening in time.
    #[error("Firebird did not become ready within {waited:?}")]
    StartupTimeout {
        /// How long readiness was awaited.
        waited: Duration,
    },
}

impl Error {
    /// Check if this error came from the container framework.
    #[must_use]
    pub fn is_container_error(&self) -> bool {
        matches!(self, Self::Container(_))
    }
}
