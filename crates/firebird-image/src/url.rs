//! JDBC URL and connection details.

use std::fmt;

use crate::config::UrlParams;

/// JDBC URL scheme of the Jaybird driver.
pub const JDBC_SCHEME: &str = "jdbc:firebirdsql";

/// Port the Firebird server listens on inside the container.
pub const FIREBIRD_PORT: u16 = 3050;

/// Query that succeeds on any Firebird database.
pub const TEST_QUERY: &str = "select 1 from RDB$DATABASE";

/// Build a Jaybird JDBC URL.
///
/// `jdbc:firebirdsql://host:port/database[?k=v&...]`
#[must_use]
pub fn jdbc_url(host: &str, port: u16, database_path: &str, params: &UrlParams) -> String {
    format!(
        "{JDBC_SCHEME}://{host}:{port}/{database_path}{}",
        params.to_query_string()
    )
}

/// Driver-neutral connection details for a running container.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Host the mapped port is reachable on.
    pub host: String,
    /// Host port mapped to [`FIREBIRD_PORT`].
    pub port: u16,
    /// Database name or path as the server expects it.
    pub database: String,
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl ConnectionInfo {
    /// Render as a JDBC URL with the given parameters.
    #[must_use]
    pub fn jdbc_url(&self, params: &UrlParams) -> String {
        jdbc_url(&self.host, self.port, &self.database, params)
    }

    /// Firebird connection string (`host/port:database`) as used by the
    /// native client library.
    #[must_use]
    pub fn fb_connection_string(&self) -> String {
        format!("{}/{}:{}", self.host, self.port, self.database)
    }
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
