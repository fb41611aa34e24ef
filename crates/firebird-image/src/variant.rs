//! Firebird image variants and their environment dialects.
//!
//! Three image families are supported. Each honours a different set of
//! environment variables for the same concerns, so every variant carries a
//! [`VariantDialect`] describing its variable names, values, and the rule
//! for turning the configured database name into the path the server sees.

use core::fmt;

use crate::reference::ImageReference;

/// Repository of the community `jacobalberty/firebird` images.
pub const LEGACY_IMAGE: &str = "jacobalberty/firebird";

/// Repository of the official Firebird project images.
pub const PROJECT_IMAGE: &str = "firebirdsql/firebird";

/// Deprecated predecessor of [`PROJECT_IMAGE`].
pub const PROJECT_ALIAS_IMAGE: &str = "ghcr.io/fdcastel/firebird";

/// Directory holding databases in the project images.
pub const PROJECT_DATA_DIR: &str = "/var/lib/firebird/data";

/// Environment variable the legacy 2.5 images use for their data directory.
pub const LEGACY_DBPATH_VARIABLE: &str = "DBPATH";

/// Data directory assumed when a legacy 2.5 container does not report `DBPATH`.
pub const LEGACY_DEFAULT_DBPATH: &str = "/firebird/data";

/// Version prefix of the legacy images that require an absolute database path.
const LEGACY_ABSOLUTE_PATH_VERSION: &str = "2.5";

/// Supported Firebird image family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageVariant {
    /// `jacobalberty/firebird`. Also used for unrecognised repositories.
    #[default]
    Legacy,
    /// `firebirdsql/firebird`.
    Project,
    /// `ghcr.io/fdcastel/firebird`, configured exactly like [`Self::Project`].
    ProjectAlias,
}

/// Environment-variable dialect of an image variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantDialect {
    /// Variable receiving the administrative (sysdba) password.
    pub admin_password: &'static str,
    /// Whether the admin password variable replaces the user/password pair
    /// when the configured user is sysdba.
    pub sysdba_replaces_user: bool,
    /// Variable enabling the legacy authentication plugin.
    pub legacy_auth: &'static str,
    /// Variable relaxing wire encryption from required to enabled.
    pub wire_crypt: &'static str,
    /// Value written to [`Self::wire_crypt`].
    pub wire_crypt_value: &'static str,
}

const LEGACY_DIALECT: VariantDialect = VariantDialect {
    admin_password: "ISC_PASSWORD",
    sysdba_replaces_user: true,
    legacy_auth: "EnableLegacyClientAuth",
    wire_crypt: "EnableWireCrypt",
    wire_crypt_value: "true",
};

const PROJECT_DIALECT: VariantDialect = VariantDialect {
    admin_password: "FIREBIRD_ROOT_PASSWORD",
    sysdba_replaces_user: false,
    legacy_auth: "FIREBIRD_USE_LEGACY_AUTH",
    wire_crypt: "FIREBIRD_CONF_WireCrypt",
    wire_crypt_value: "Enabled",
};

/// How the configured database name maps to the path used once running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabasePathRule {
    /// The configured name is used as-is.
    Unchanged,
    /// Prefix with a directory read from the running container's environment.
    LiveEnvPrefix {
        /// Environment variable holding the directory.
        variable: &'static str,
        /// Directory used when the variable is not set.
        fallback: &'static str,
    },
    /// Prefix relative names with a fixed directory.
    FixedPrefix(&'static str),
}

impl DatabasePathRule {
    /// Apply the rule to a configured database name.
    ///
    /// `lookup` is only consulted for [`Self::LiveEnvPrefix`].
    pub fn apply<F>(&self, database_name: &str, lookup: F) -> String
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match *self {
            Self::Unchanged => database_name.to_string(),
            Self::LiveEnvPrefix { variable, fallback } => {
                let dir = lookup(variable).unwrap_or_else(|| fallback.to_string());
                format!("{dir}/{database_name}")
            }
            Self::FixedPrefix(dir) => {
                if database_name.starts_with('/') {
                    database_name.to_string()
                } else {
                    format!("{dir}/{database_name}")
                }
            }
        }
    }

    /// Container environment variable the rule reads after start, if any.
    #[must_use]
    pub const fn live_variable(&self) -> Option<&'static str> {
        match *self {
            Self::LiveEnvPrefix { variable, .. } => Some(variable),
            Self::Unchanged | Self::FixedPrefix(_) => None,
        }
    }
}

impl ImageVariant {
    /// All variants, in resolution order.
    pub const ALL: [Self; 3] = [Self::Legacy, Self::Project, Self::ProjectAlias];

    /// Repository identifier matched by this variant.
    #[must_use]
    pub const fn repository(self) -> &'static str {
        match self {
            Self::Legacy => LEGACY_IMAGE,
            Self::Project => PROJECT_IMAGE,
            Self::ProjectAlias => PROJECT_ALIAS_IMAGE,
        }
    }

    /// Environment-variable dialect of this variant.
    #[must_use]
    pub const fn dialect(self) -> &'static VariantDialect {
        match self {
            Self::Legacy => &LEGACY_DIALECT,
            Self::Project | Self::ProjectAlias => &PROJECT_DIALECT,
        }
    }

    /// Database path rule for an image of this variant with the given version.
    ///
    /// Legacy images only need an absolute path on the 2.5 line; every other
    /// legacy version keeps the configured name. Unknown repositories resolve
    /// to [`Self::Legacy`], so a `2.5*` tag gets the `DBPATH` prefix there too.
    #[must_use]
    pub fn database_path_rule(self, version: &str) -> DatabasePathRule {
        match self {
            Self::Legacy if version.starts_with(LEGACY_ABSOLUTE_PATH_VERSION) => {
                DatabasePathRule::LiveEnvPrefix {
                    variable: LEGACY_DBPATH_VARIABLE,
                    fallback: LEGACY_DEFAULT_DBPATH,
                }
            }
            Self::Legacy => DatabasePathRule::Unchanged,
            Self::Project | Self::ProjectAlias => DatabasePathRule::FixedPrefix(PROJECT_DATA_DIR),
        }
    }
}

impl fmt::Display for ImageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.repository())
    }
}

/// Determine the image variant of an already parsed reference.
#[must_use]
pub fn variant_of(reference: &ImageReference) -> ImageVariant {
    let repository = reference.unversioned();
    ImageVariant::ALL
        .into_iter()
        .find(|variant| variant.repository() == repository)
        .unwrap_or_default()
}

/// Determine the image variant of an image reference string.
///
/// Matching is exact and case-sensitive on the repository with tag and
/// digest stripped. Unknown or unparseable references resolve to
/// [`ImageVariant::Legacy`] so that mirrors and private registries keep
/// working.
#[must_use]
pub fn resolve_variant(image_reference: &str) -> ImageVariant {
    match ImageReference::parse(image_reference) {
        Ok(reference) => variant_of(&reference),
        Err(_) => ImageVariant::default(),
    }
}
