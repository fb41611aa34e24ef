//! # firebird-image
//!
//! Configuration logic for Firebird database containers.
//!
//! Three Docker image families ship Firebird, each reading a different set of
//! environment variables. This crate maps one configuration record onto the
//! variables and JDBC URL parameters of whichever family an image reference
//! belongs to.
//!
//! ## Design Philosophy
//!
//! This crate is intentionally IO-agnostic. It knows nothing about Docker;
//! `firebird-testing` hands its output to `testcontainers`.
//!
//! ## Example
//!
//! ```rust
//! use firebird_image::{CipherPolicy, FirebirdConfig, build_environment, resolve_variant};
//!
//! let variant = resolve_variant("firebirdsql/firebird:5.0.1");
//! let config = FirebirdConfig::new()
//!     .with_username("sysdba")
//!     .with_password("masterkey")
//!     .with_enable_legacy_client_auth();
//!
//! let setup = build_environment(&config, variant, &CipherPolicy::default());
//! assert_eq!(setup.env.get("FIREBIRD_ROOT_PASSWORD"), Some("masterkey"));
//! assert_eq!(setup.url_params.get("authPlugins"), Some("Srp256,Srp,Legacy_Auth"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod environment;
pub mod error;
pub mod probe;
pub mod provider;
pub mod reference;
pub mod url;
pub mod variant;

pub use config::{FirebirdConfig, SYSDBA, UrlParams};
pub use environment::{ContainerSetup, Environment, LEGACY_AUTH_PLUGINS, build_environment};
pub use error::Error;
pub use probe::{ARC4_REQUIRED_BITS, CipherPolicy, ProbeError, WireCryptProbe};
pub use provider::{DEFAULT_TAG, TcUrl};
pub use reference::ImageReference;
pub use url::{ConnectionInfo, FIREBIRD_PORT, TEST_QUERY, jdbc_url};
pub use variant::{DatabasePathRule, ImageVariant, VariantDialect, resolve_variant, variant_of};

/// Database path as seen by clients.
///
/// Before the container runs this is always the configured name. Once
/// running it follows the variant's [`DatabasePathRule`] for the image
/// version; `live_env` answers environment lookups against the running
/// container.
pub fn effective_database_path<F>(
    config: &FirebirdConfig,
    image: &ImageReference,
    is_running: bool,
    live_env: F,
) -> String
where
    F: FnOnce(&str) -> Option<String>,
{
    if !is_running {
        return config.database_name.clone();
    }
    variant_of(image)
        .database_path_rule(image.version())
        .apply(&config.database_name, live_env)
}
