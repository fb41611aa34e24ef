//! Handle to a started Firebird container.

use std::time::Duration;

use firebird_image::{ConnectionInfo, FIREBIRD_PORT, effective_database_path};
use testcontainers::ContainerAsync;
use tokio::time::Instant;

use crate::container::FirebirdImage;
use crate::error::Error;
use crate::runtime::ContainerRuntime;

/// Delay between readiness checks.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A started Firebird container.
///
/// The configuration is frozen: the handle keeps its own copy of the image
/// it was started from. Dropping the handle removes the container.
#[derive(Debug)]
pub struct RunningFirebird<R = ContainerAsync<FirebirdImage>> {
    runtime: R,
    image: FirebirdImage,
}

impl RunningFirebird {
    /// Wrap a container started through `testcontainers` directly, e.g.
    /// after customising the request with `ImageExt`.
    ///
    /// Call [`Self::wait_until_ready`] before connecting.
    #[must_use]
    pub fn from_container(container: ContainerAsync<FirebirdImage>) -> Self {
        let image = container.image().clone();
        Self {
            runtime: container,
            image,
        }
    }
}

impl<R: ContainerRuntime> RunningFirebird<R> {
    /// Wrap any container runtime together with the image it runs.
    pub fn new(runtime: R, image: FirebirdImage) -> Self {
        Self { runtime, image }
    }

    /// The underlying container.
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Consume the handle, returning the underlying container.
    pub fn into_runtime(self) -> R {
        self.runtime
    }

    /// The image this container was started from.
    pub fn image(&self) -> &FirebirdImage {
        &self.image
    }

    /// Wait until the server listens on its port inside the container.
    ///
    /// The images create the database and users before the server starts,
    /// so once the port listens a login with the configured credentials
    /// succeeds.
    ///
    /// Each check is bounded by the time left, so a stuck exec cannot
    /// outlast `timeout`.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Result<(), Error> {
        let started = Instant::now();
        loop {
            let remaining = timeout.saturating_sub(started.elapsed());
            let listening =
                tokio::time::timeout(remaining, self.runtime.is_port_listening(FIREBIRD_PORT))
                    .await
                    .map_err(|_| Error::StartupTimeout { waited: timeout })??;
            if listening {
                tracing::info!(
                    image = %self.image.reference(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Firebird container is ready"
                );
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(Error::StartupTimeout { waited: timeout });
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    /// Host on which the server is reachable.
    pub async fn host(&self) -> Result<String, Error> {
        self.runtime.host().await
    }

    /// Host port mapped to the Firebird port.
    pub async fn port(&self) -> Result<u16, Error> {
        self.runtime.mapped_port(FIREBIRD_PORT).await
    }

    /// Database path clients must use.
    ///
    /// Legacy 2.5 images need an absolute path under the container's
    /// `DBPATH`; project images keep databases under `/var/lib/firebird/data`.
    pub async fn database_name(&self) -> Result<String, Error> {
        let image = &self.image;
        let rule = image.variant().database_path_rule(image.reference().version());
        let live = match rule.live_variable() {
            Some(variable) => self.runtime.env_var(variable).await?,
            None => None,
        };
        Ok(effective_database_path(image.config(), image.reference(), true, |_| live))
    }

    /// Username.
    pub fn username(&self) -> &str {
        self.image.username()
    }

    /// Password.
    pub fn password(&self) -> &str {
        self.image.password()
    }

    /// Jaybird JDBC URL, including configured and injected URL parameters.
    pub async fn jdbc_url(&self) -> Result<String, Error> {
        let info = self.connection_info().await?;
        Ok(info.jdbc_url(&self.image.setup().url_params))
    }

    /// Connection details for non-JDBC clients.
    pub async fn connection_info(&self) -> Result<ConnectionInfo, Error> {
        Ok(ConnectionInfo {
            host: self.host().await?,
            port: self.port().await?,
            database: self.database_name().await?,
            username: self.username().to_string(),
            password: self.password().to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use firebird_image::CipherPolicy;

    use super::*;

    #[derive(Debug, Default)]
    struct FakeRuntime {
        env: HashMap<String, String>,
        ready_after: usize,
        stuck: bool,
        checks: AtomicUsize,
        env_lookups: AtomicUsize,
    }

    #[async_trait]
    impl ContainerRuntime for FakeRuntime {
        async fn host(&self) -> Result<String, Error> {
            Ok("localhost".into())
        }

        async fn mapped_port(&self, port: u16) -> Result<u16, Error> {
            assert_eq!(port, FIREBIRD_PORT);
            Ok(49153)
        }

        async fn env_var(&self, name: &str) -> Result<Option<String>, Error> {
            self.env_lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.env.get(name).cloned())
        }

        async fn is_port_listening(&self, _port: u16) -> Result<bool, Error> {
            if self.stuck {
                std::future::pending::<()>().await;
            }
            Ok(self.checks.fetch_add(1, Ordering::SeqCst) >= self.ready_after)
        }
    }

    fn running(image: &str, runtime: FakeRuntime) -> RunningFirebird<FakeRuntime> {
        let image = FirebirdImage::new(image)
            .unwrap()
            .with_cipher_policy(CipherPolicy::Unrestricted);
        RunningFirebird::new(runtime, image)
    }

    #[tokio::test]
    async fn test_jdbc_url_without_params() {
        let fb = running("jacobalberty/firebird:3.0.7", FakeRuntime::default());
        assert_eq!(
            fb.jdbc_url().await.unwrap(),
            "jdbc:firebirdsql://localhost:49153/test"
        );
    }

    #[tokio::test]
    async fn test_jdbc_url_with_additional_params() {
        let runtime = FakeRuntime::default();
        let image = FirebirdImage::default()
            .with_cipher_policy(CipherPolicy::Unrestricted)
            .with_url_param("charSet", "utf-8")
            .with_url_param("blobBufferSize", "2048");
        let fb = RunningFirebird::new(runtime, image);
        assert_eq!(
            fb.jdbc_url().await.unwrap(),
            "jdbc:firebirdsql://localhost:49153/test?charSet=utf-8&blobBufferSize=2048"
        );
    }

    #[tokio::test]
    async fn test_jdbc_url_with_legacy_auth() {
        let image = FirebirdImage::default()
            .with_cipher_policy(CipherPolicy::Unrestricted)
            .with_enable_legacy_client_auth();
        let fb = RunningFirebird::new(FakeRuntime::default(), image);
        let url = fb.jdbc_url().await.unwrap();
        assert!(url.ends_with("?authPlugins=Srp256,Srp,Legacy_Auth"), "{url}");
    }

    #[tokio::test]
    async fn test_jdbc_url_with_explicit_auth_plugins() {
        let image = FirebirdImage::default()
            .with_cipher_policy(CipherPolicy::Unrestricted)
            .with_enable_legacy_client_auth()
            .with_url_param("authPlugins", "Legacy_Auth");
        let fb = RunningFirebird::new(FakeRuntime::default(), image);
        let url = fb.jdbc_url().await.unwrap();
        assert!(url.ends_with("?authPlugins=Legacy_Auth"), "{url}");
    }

    #[tokio::test]
    async fn test_legacy_25_database_path_uses_dbpath() {
        let fb = running("jacobalberty/firebird:2.5.9-sc", FakeRuntime::default());
        assert_eq!(fb.image().database_name(), "test");
        assert_eq!(fb.database_name().await.unwrap(), "/firebird/data/test");

        let runtime = FakeRuntime {
            env: HashMap::from([("DBPATH".to_string(), "/data".to_string())]),
            ..FakeRuntime::default()
        };
        let fb = running("jacobalberty/firebird:2.5.9-ss", runtime);
        assert_eq!(fb.database_name().await.unwrap(), "/data/test");
        assert_eq!(
            fb.jdbc_url().await.unwrap(),
            "jdbc:firebirdsql://localhost:49153//data/test"
        );
    }

    #[tokio::test]
    async fn test_database_path_skips_lookup_when_not_needed() {
        let fb = running("jacobalberty/firebird:v4.0.2", FakeRuntime::default());
        assert_eq!(fb.database_name().await.unwrap(), "test");

        let fb2 = running("firebirdsql/firebird:5.0.1", FakeRuntime::default());
        assert_eq!(
            fb2.database_name().await.unwrap(),
            "/var/lib/firebird/data/test"
        );

        assert_eq!(fb.runtime().env_lookups.load(Ordering::SeqCst), 0);
        assert_eq!(fb2.runtime().env_lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_connection_info() {
        let image = FirebirdImage::new("firebirdsql/firebird:5.0.1")
            .unwrap()
            .with_username("testuser")
            .with_password("testpassword");
        let info = RunningFirebird::new(FakeRuntime::default(), image)
            .connection_info()
            .await
            .unwrap();
        assert_eq!(info.host, "localhost");
        assert_eq!(info.port, 49153);
        assert_eq!(info.database, "/var/lib/firebird/data/test");
        assert_eq!(info.username, "testuser");
        assert_eq!(info.password, "testpassword");
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_ready_polls() {
        let runtime = FakeRuntime {
            ready_after: 3,
            ..FakeRuntime::default()
        };
        let fb = running("firebirdsql/firebird:5.0.1", runtime);
        fb.wait_until_ready(Duration::from_secs(60)).await.unwrap();
        assert_eq!(fb.runtime().checks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_wait_until_ready_times_out() {
        let runtime = FakeRuntime {
            ready_after: usize::MAX,
            ..FakeRuntime::default()
        };
        let fb = running("firebirdsql/firebird:5.0.1", runtime);
        let err = fb.wait_until_ready(Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, Error::StartupTimeout { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_ready_bounds_stuck_check() {
        let runtime = FakeRuntime {
            stuck: true,
            ..FakeRuntime::default()
        };
        let fb = running("jacobalberty/firebird:3.0.7", runtime);
        let err = fb.wait_until_ready(Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::StartupTimeout { waited } if waited == Duration::from_secs(5)
        ));
        assert_eq!(fb.runtime().checks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_into_runtime_returns_container() {
        let runtime = FakeRuntime {
            env: HashMap::from([("DBPATH".to_string(), "/data".to_string())]),
            ..FakeRuntime::default()
        };
        let fb = running("jacobalberty/firebird:2.5.9-sc", runtime);
        assert_eq!(fb.database_name().await.unwrap(), "/data/test");

        let runtime = fb.into_runtime();
        assert_eq!(runtime.env_lookups.load(Ordering::SeqCst), 1);
    }
}
