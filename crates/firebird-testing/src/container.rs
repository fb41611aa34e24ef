//! Firebird container support via testcontainers.

use std::borrow::Cow;
use std::sync::OnceLock;
use std::time::Duration;

use firebird_image::provider::DEFAULT_TAG;
use firebird_image::variant::LEGACY_IMAGE;
use firebird_image::{
    CipherPolicy, ContainerSetup, FIREBIRD_PORT, FirebirdConfig, ImageReference, ImageVariant,
    TcUrl, build_environment, effective_database_path, variant_of,
};
use testcontainers::Image;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;

use crate::error::Error;
use crate::running::RunningFirebird;

/// How long [`FirebirdImage::start`] waits for the server by default.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(120);

static EXPOSED_PORTS: [ContainerPort; 1] = [ContainerPort::Tcp(FIREBIRD_PORT)];

/// Firebird container image.
///
/// Works with `jacobalberty/firebird`, `firebirdsql/firebird` and
/// `ghcr.io/fdcastel/firebird`; other repositories are configured like
/// `jacobalberty/firebird`.
///
/// The container environment is materialised the first time it is needed
/// (at the latest when the container starts). Builder methods consume the
/// image and discard any environment already built.
#[derive(Debug, Clone)]
pub struct FirebirdImage {
    reference: ImageReference,
    config: FirebirdConfig,
    cipher_policy: CipherPolicy,
    startup_timeout: Duration,
    setup: OnceLock<ContainerSetup>,
}

impl Default for FirebirdImage {
    fn default() -> Self {
        Self::from_parts(ImageReference::from_parts(LEGACY_IMAGE, DEFAULT_TAG))
    }
}

impl FirebirdImage {
    /// Create a Firebird image from a reference such as `jacobalberty/firebird:3.0.7`.
    pub fn new(image_reference: &str) -> Result<Self, Error> {
        Self::from_reference(ImageReference::parse(image_reference)?)
    }

    /// Create a Firebird image from a parsed reference.
    ///
    /// Digest references are rejected because the runner pulls by tag.
    pub fn from_reference(reference: ImageReference) -> Result<Self, Error> {
        if reference.digest().is_some() {
            return Err(firebird_image::Error::DigestNotSupported(reference.to_string()).into());
        }
        Ok(Self::from_parts(reference))
    }

    /// Create a Firebird image from a `jdbc:tc:firebird...` URL.
    pub fn from_tc_url(url: &str) -> Result<Self, Error> {
        let tc_url = TcUrl::parse(url)?;
        if !tc_url.container_params.is_empty() {
            tracing::debug!(
                params = ?tc_url.container_params.iter().map(|(k, _)| k).collect::<Vec<_>>(),
                "ignoring container parameters in jdbc:tc: URL"
            );
        }
        Ok(Self::from_reference(tc_url.image_reference()?)?.with_config(tc_url.to_config()))
    }

    fn from_parts(reference: ImageReference) -> Self {
        Self {
            reference,
            config: FirebirdConfig::default(),
            cipher_policy: CipherPolicy::from_env(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            setup: OnceLock::new(),
        }
    }

    fn configure(mut self, f: impl FnOnce(FirebirdConfig) -> FirebirdConfig) -> Self {
        self.config = f(self.config);
        self.setup = OnceLock::new();
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn with_config(self, config: FirebirdConfig) -> Self {
        self.configure(|_| config)
    }

    /// Set the database name.
    #[must_use]
    pub fn with_database_name(self, database_name: impl Into<String>) -> Self {
        self.configure(|c| c.with_database_name(database_name))
    }

    /// Set the username.
    #[must_use]
    pub fn with_username(self, username: impl Into<String>) -> Self {
        self.configure(|c| c.with_username(username))
    }

    /// Set the password.
    #[must_use]
    pub fn with_password(self, password: impl Into<String>) -> Self {
        self.configure(|c| c.with_password(password))
    }

    /// Set the sysdba password.
    ///
    /// If the username is `sysdba` (case-insensitive), the regular password
    /// is used instead.
    #[must_use]
    pub fn with_sysdba_password(self, sysdba_password: impl Into<String>) -> Self {
        self.configure(|c| c.with_sysdba_password(sysdba_password))
    }

    /// Set the server time zone, defaults to the host zone.
    #[must_use]
    pub fn with_time_zone(self, time_zone: impl Into<String>) -> Self {
        self.configure(|c| c.with_time_zone(time_zone))
    }

    /// Enable the legacy authentication plugin and allow it in the JDBC URL.
    #[must_use]
    pub fn with_enable_legacy_client_auth(self) -> Self {
        self.configure(FirebirdConfig::with_enable_legacy_client_auth)
    }

    /// Relax wire encryption from required to enabled.
    #[must_use]
    pub fn with_enable_wire_crypt(self) -> Self {
        self.configure(FirebirdConfig::with_enable_wire_crypt)
    }

    /// Add a parameter to the JDBC URL.
    #[must_use]
    pub fn with_url_param(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configure(|c| c.with_url_param(key, value))
    }

    /// Override the client cipher policy used to decide on wire encryption.
    #[must_use]
    pub fn with_cipher_policy(mut self, cipher_policy: CipherPolicy) -> Self {
        self.cipher_policy = cipher_policy;
        self.setup = OnceLock::new();
        self
    }

    /// Set how long [`Self::start`] waits for the server to listen.
    #[must_use]
    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// The image reference.
    #[must_use]
    pub fn reference(&self) -> &ImageReference {
        &self.reference
    }

    /// The image variant.
    #[must_use]
    pub fn variant(&self) -> ImageVariant {
        variant_of(&self.reference)
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &FirebirdConfig {
        &self.config
    }

    /// Readiness timeout.
    #[must_use]
    pub fn startup_timeout(&self) -> Duration {
        self.startup_timeout
    }

    /// The container environment and URL parameters, built on first use.
    pub fn setup(&self) -> &ContainerSetup {
        self.setup
            .get_or_init(|| build_environment(&self.config, self.variant(), &self.cipher_policy))
    }

    /// Database name as configured. See [`RunningFirebird::database_name`]
    /// for the path clients use once the container runs.
    #[must_use]
    pub fn database_name(&self) -> String {
        effective_database_path(&self.config, &self.reference, false, |_| None)
    }

    /// Username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.config.username
    }

    /// Password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.config.password
    }

    /// Start the container and wait until Firebird accepts connections.
    pub async fn start(self) -> Result<RunningFirebird, Error> {
        let timeout = self.startup_timeout;
        tracing::debug!(image = %self.reference, variant = %self.variant(), "starting Firebird container");
        let container = AsyncRunner::start(self).await?;
        let running = RunningFirebird::from_container(container);
        running.wait_until_ready(timeout).await?;
        Ok(running)
    }
}

impl Image for FirebirdImage {
    fn name(&self) -> &str {
        self.reference.unversioned()
    }

    fn tag(&self) -> &str {
        self.reference.version()
    }

    fn ready_conditions(&self) -> Vec<WaitFor> {
        // Readiness is checked inside the container after start, see
        // `RunningFirebird::wait_until_ready`.
        Vec::new()
    }

    fn env_vars(
        &self,
    ) -> impl IntoIterator<Item = (impl Into<Cow<'_, str>>, impl Into<Cow<'_, str>>)> {
        self.setup().env.iter()
    }

    fn expose_ports(&self) -> &[ContainerPort] {
        &EXPOSED_PORTS
    }
}
