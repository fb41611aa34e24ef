//! Firebird container configuration.

/// Default database name.
pub const DEFAULT_DATABASE: &str = "test";

/// Default username.
pub const DEFAULT_USERNAME: &str = "test";

/// Default password.
pub const DEFAULT_PASSWORD: &str = "test";

/// Name of the Firebird administrative account.
pub const SYSDBA: &str = "sysdba";

/// URL parameter selecting the client authentication plugins.
pub const AUTH_PLUGINS_PARAM: &str = "authPlugins";

/// Time zone used when the host zone cannot be determined.
const FALLBACK_TIME_ZONE: &str = "UTC";

/// Ordered URL parameters.
///
/// Keeps insertion order so the generated query string is deterministic.
/// Setting an existing key replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParams {
    entries: Vec<(String, String)>,
}

impl UrlParams {
    /// Create an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Get the value of a parameter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a parameter is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a query string: empty, or `?` followed by `k=v` pairs joined with `&`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let pairs: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        format!("?{}", pairs.join("&"))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UrlParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// User-facing configuration of a Firebird container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebirdConfig {
    /// Database name (or path) to create.
    pub database_name: String,
    /// Username to create.
    pub username: String,
    /// Password of [`Self::username`].
    pub password: String,
    /// Sysdba password. Ignored when [`Self::username`] is sysdba.
    pub sysdba_password: Option<String>,
    /// Time zone of the server, e.g. `Europe/Amsterdam`.
    pub time_zone: String,
    /// Enable the legacy authentication plugin.
    pub enable_legacy_client_auth: bool,
    /// Relax wire encryption from required to enabled.
    pub enable_wire_crypt: bool,
    /// Extra parameters appended to the JDBC URL.
    pub url_params: UrlParams,
}

impl Default for FirebirdConfig {
    fn default() -> Self {
        Self {
            database_name: DEFAULT_DATABASE.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            sysdba_password: None,
            time_zone: host_time_zone(),
            enable_legacy_client_auth: false,
            enable_wire_crypt: false,
            url_params: UrlParams::new(),
        }
    }
}

impl FirebirdConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database name.
    #[must_use]
    pub fn with_database_name(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = database_name.into();
        self
    }

    /// Set the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the sysdba password.
    ///
    /// If the username is `sysdba` (case-insensitive), the password set with
    /// [`Self::with_password`] is used instead.
    #[must_use]
    pub fn with_sysdba_password(mut self, sysdba_password: impl Into<String>) -> Self {
        self.sysdba_password = Some(sysdba_password.into());
        self
    }

    /// Set the server time zone. Prefer long names like `Europe/Amsterdam`.
    #[must_use]
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }

    /// Enable the legacy authentication plugin (`Legacy_Auth`).
    #[must_use]
    pub fn with_enable_legacy_client_auth(mut self) -> Self {
        self.enable_legacy_client_auth = true;
        self
    }

    /// Relax the server wire encryption setting from required to enabled.
    #[must_use]
    pub fn with_enable_wire_crypt(mut self) -> Self {
        self.enable_wire_crypt = true;
        self
    }

    /// Add a parameter to the JDBC URL.
    #[must_use]
    pub fn with_url_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.url_params.insert(key, value);
        self
    }

    /// Whether the configured user is the administrative account.
    #[must_use]
    pub fn is_sysdba(&self) -> bool {
        self.username.eq_ignore_ascii_case(SYSDBA)
    }

    /// The administrative password the container will be given, if any.
    #[must_use]
    pub fn admin_password(&self) -> Option<&str> {
        if self.is_sysdba() {
            Some(&self.password)
        } else {
            self.sysdba_password.as_deref()
        }
    }
}

/// Host default time zone: `TZ`, then `/etc/timezone`, then UTC.
#[must_use]
pub fn host_time_zone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        let tz = tz.trim().trim_start_matches(':');
        if !tz.is_empty() {
            return tz.to_string();
        }
    }
    if let Ok(contents) = std::fs::read_to_string("/etc/timezone") {
        let tz = contents.trim();
        if !tz.is_empty() {
            return tz.to_string();
        }
    }
    FALLBACK_TIME_ZONE.to_string()
}
