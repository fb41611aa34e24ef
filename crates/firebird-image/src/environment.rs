//! Container environment construction.

use crate::config::{AUTH_PLUGINS_PARAM, FirebirdConfig, UrlParams};
use crate::probe::WireCryptProbe;
use crate::variant::ImageVariant;

/// Time zone variable, honoured by every variant.
pub const TZ_VAR: &str = "TZ";
/// Database to create on first start.
pub const DATABASE_VAR: &str = "FIREBIRD_DATABASE";
/// Non-administrative user to create.
pub const USER_VAR: &str = "FIREBIRD_USER";
/// Password of [`USER_VAR`].
pub const PASSWORD_VAR: &str = "FIREBIRD_PASSWORD";

/// Auth plugin list allowing legacy auth while keeping SRP preferred.
pub const LEGACY_AUTH_PLUGINS: &str = "Srp256,Srp,Legacy_Auth";

/// Ordered environment variable assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: Vec<(String, String)>,
}

impl Environment {
    /// Set a variable, replacing an earlier assignment of the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.vars.push((name, value)),
        }
    }

    /// Value of a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a variable is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over assignments in the order they were made.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Names of all assigned variables.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.iter().map(|(n, _)| n.as_str())
    }

    /// Number of assignments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether nothing is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Everything needed to launch and connect to a container of one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSetup {
    /// Variant the setup was built for.
    pub variant: ImageVariant,
    /// Environment to pass to the container.
    pub env: Environment,
    /// URL parameters, including any injected `authPlugins`.
    pub url_params: UrlParams,
    /// Wire encryption was relaxed because the client cannot negotiate it.
    pub wire_crypt_downgraded: bool,
}

/// Build the container environment and URL parameters for a variant.
///
/// The result depends only on the configuration, the variant, and the
/// probe's answer.
pub fn build_environment<P>(config: &FirebirdConfig, variant: ImageVariant, probe: &P) -> ContainerSetup
where
    P: WireCryptProbe + ?Sized,
{
    let dialect = variant.dialect();
    let mut env = Environment::default();
    let mut url_params = config.url_params.clone();

    env.set(TZ_VAR, config.time_zone.as_str());
    env.set(DATABASE_VAR, config.database_name.as_str());

    if config.is_sysdba() && dialect.sysdba_replaces_user {
        env.set(dialect.admin_password, config.password.as_str());
    } else {
        env.set(USER_VAR, config.username.as_str());
        env.set(PASSWORD_VAR, config.password.as_str());
        if let Some(admin_password) = config.admin_password() {
            env.set(dialect.admin_password, admin_password);
        }
    }

    if config.enable_legacy_client_auth {
        env.set(dialect.legacy_auth, "true");
        if !url_params.contains_key(AUTH_PLUGINS_PARAM) {
            url_params.insert(AUTH_PLUGINS_PARAM, LEGACY_AUTH_PLUGINS);
        }
    }

    let mut wire_crypt_downgraded = false;
    if config.enable_wire_crypt {
        env.set(dialect.wire_crypt, dialect.wire_crypt_value);
    } else if !probe.is_supported() {
        tracing::warn!(
            "client runtime does not support wire protocol encryption requirements; \
             downgrading server to {} = {}",
            dialect.wire_crypt,
            dialect.wire_crypt_value
        );
        env.set(dialect.wire_crypt, dialect.wire_crypt_value);
        wire_crypt_downgraded = true;
    }

    tracing::debug!(
        %variant,
        vars = ?env.names().collect::<Vec<_>>(),
        "resolved Firebird container environment"
    );

    ContainerSetup {
        variant,
        env,
        url_params,
        wire_crypt_downgraded,
    }
}
