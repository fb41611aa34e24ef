//! `jdbc:tc:` URL support.
//!
//! Lets a test describe a throwaway database entirely in a URL:
//!
//! ```text
//! jdbc:tc:firebird:3.0.7://hostname/databasename?user=someuser&password=somepwd&charSet=utf-8
//! ```
//!
//! The host part is a placeholder; the container decides where the server
//! is reachable.

use crate::config::{FirebirdConfig, UrlParams};
use crate::error::Error;
use crate::reference::ImageReference;
use crate::variant::LEGACY_IMAGE;

/// Prefix of container-backed JDBC URLs.
pub const TC_URL_PREFIX: &str = "jdbc:tc:";

/// Database type accepted in a `jdbc:tc:` URL.
pub const NAME: &str = "firebird";

/// Alternate database type accepted in a `jdbc:tc:` URL.
pub const ALTERNATE_NAME: &str = "firebirdsql";

/// Tag used when the URL does not name one.
pub const DEFAULT_TAG: &str = "3.0.5";

/// Query parameter carrying the username.
pub const USER_PARAM: &str = "user";

/// Query parameter carrying the password.
pub const PASSWORD_PARAM: &str = "password";

/// Prefix of parameters addressed to the container layer instead of the driver.
pub const CONTAINER_PARAM_PREFIX: &str = "TC_";

/// Whether this provider handles the given `jdbc:tc:` database type.
#[must_use]
pub fn supports(database_type: &str) -> bool {
    database_type == NAME || database_type == ALTERNATE_NAME
}

/// A parsed `jdbc:tc:firebird...` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcUrl {
    /// `firebird` or `firebirdsql`.
    pub database_type: String,
    /// Image tag, if the URL names one.
    pub tag: Option<String>,
    /// Placeholder host from the URL.
    pub host: String,
    /// Database name.
    pub database: String,
    /// Value of the `user` parameter.
    pub user: Option<String>,
    /// Value of the `password` parameter.
    pub password: Option<String>,
    /// Driver parameters, in URL order.
    pub params: UrlParams,
    /// `TC_*` parameters, in URL order.
    pub container_params: UrlParams,
}

impl TcUrl {
    /// Parse a `jdbc:tc:` URL.
    pub fn parse(url: &str) -> Result<Self, Error> {
        let rest = url
            .trim()
            .strip_prefix(TC_URL_PREFIX)
            .ok_or_else(|| Error::InvalidTcUrl(format!("{url}: missing {TC_URL_PREFIX} prefix")))?;

        let (type_and_tag, rest) = rest
            .split_once("://")
            .ok_or_else(|| Error::InvalidTcUrl(format!("{url}: missing ://")))?;

        let (database_type, tag) = match type_and_tag.split_once(':') {
            Some((_, "")) => {
                return Err(Error::InvalidTcUrl(format!("{url}: empty image tag")));
            }
            Some((database_type, tag)) => (database_type, Some(tag.to_string())),
            None => (type_and_tag, None),
        };
        if !supports(database_type) {
            return Err(Error::UnsupportedDatabaseType(database_type.to_string()));
        }

        let (location, query) = match rest.split_once('?') {
            Some((location, query)) => (location, query),
            None => (rest, ""),
        };
        let (host, database) = location
            .split_once('/')
            .ok_or_else(|| Error::InvalidTcUrl(format!("{url}: missing database path")))?;
        if database.is_empty() {
            return Err(Error::InvalidTcUrl(format!("{url}: empty database name")));
        }

        let mut parsed = Self {
            database_type: database_type.to_string(),
            tag,
            host: host.to_string(),
            database: database.to_string(),
            user: None,
            password: None,
            params: UrlParams::new(),
            container_params: UrlParams::new(),
        };

        for part in query.split('&') {
            if part.is_empty() {
                continue;
            }
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| Error::InvalidTcUrl(format!("invalid key-value: {part}")))?;
            match key {
                USER_PARAM => parsed.user = Some(value.to_string()),
                PASSWORD_PARAM => parsed.password = Some(value.to_string()),
                _ if key.starts_with(CONTAINER_PARAM_PREFIX) => {
                    parsed.container_params.insert(key, value);
                }
                _ => parsed.params.insert(key, value),
            }
        }

        Ok(parsed)
    }

    /// Image to run: the legacy image at the URL's tag, or [`DEFAULT_TAG`].
    pub fn image_reference(&self) -> Result<ImageReference, Error> {
        ImageReference::with_tag(LEGACY_IMAGE, self.tag.as_deref().unwrap_or(DEFAULT_TAG))
    }

    /// Container configuration described by the URL.
    #[must_use]
    pub fn to_config(&self) -> FirebirdConfig {
        let mut config = FirebirdConfig::new().with_database_name(self.database.as_str());
        if let Some(user) = &self.user {
            config = config.with_username(user.as_str());
        }
        if let Some(password) = &self.password {
            config = config.with_password(password.as_str());
        }
        config.url_params = self.params.clone();
        config
    }
}
