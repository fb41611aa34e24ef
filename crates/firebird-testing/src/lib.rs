//! # firebird-testing
//!
//! Disposable Firebird databases for integration tests.
//!
//! This crate runs Firebird Docker images through testcontainers and hands
//! back the JDBC URL (or plain connection details) once the server listens.
//!
//! ## Features
//!
//! - Supports `jacobalberty/firebird`, `firebirdsql/firebird` and
//!   `ghcr.io/fdcastel/firebird` images
//! - Credentials, time zone, legacy auth and wire encryption options
//! - `jdbc:tc:firebird://...` URLs as a one-line container description
//! - Database path resolution for images that need absolute paths
//!
//! ## Example
//!
//! ```rust,ignore
//! use firebird_testing::FirebirdImage;
//!
//! #[tokio::test]
//! async fn test_with_real_server() {
//!     let firebird = FirebirdImage::new("firebirdsql/firebird:5.0.1")
//!         .unwrap()
//!         .with_username("testuser")
//!         .with_password("testpassword")
//!         .start()
//!         .await
//!         .unwrap();
//!
//!     let url = firebird.jdbc_url().await.unwrap();
//!     // jdbc:firebirdsql://localhost:49153//var/lib/firebird/data/test
//! }
//! ```
//!
//! ## URL Example
//!
//! ```rust,ignore
//! let firebird = firebird_testing::start_from_tc_url(
//!     "jdbc:tc:firebird:3.0.7://hostname/databasename?user=someuser&password=somepwd",
//! )
//! .await
//! .unwrap();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod container;
pub mod error;
pub mod running;
pub mod runtime;

pub use container::{DEFAULT_STARTUP_TIMEOUT, FirebirdImage};
pub use error::Error;
pub use firebird_image::{
    CipherPolicy, ConnectionInfo, DEFAULT_TAG, FIREBIRD_PORT, FirebirdConfig, ImageVariant,
    TEST_QUERY,
};
pub use running::RunningFirebird;
pub use runtime::ContainerRuntime;

/// Start a container described by a `jdbc:tc:firebird...` URL.
pub async fn start_from_tc_url(url: &str) -> Result<RunningFirebird, Error> {
    FirebirdImage::from_tc_url(url)?.start().await
}
