//! Live container tests.
//!
//! These tests pull and run Firebird images and log in with the pure Rust
//! client, running the validation query. They are ignored by default and
//! can be run with:
//!
//! ```bash
//! cargo test -p firebird-testing --test container -- --ignored
//! ```
//!
//! Set `RUST_LOG=firebird_testing=debug` to see container setup logs.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use firebird_testing::{
    CipherPolicy, ConnectionInfo, ContainerRuntime, FirebirdImage, ImageVariant, RunningFirebird,
    TEST_QUERY,
};
use rsfbclient::{FbError, Queryable};
use tokio::net::TcpStream;

const FIREBIRD_307_IMAGE: &str = "jacobalberty/firebird:3.0.7";
const FIREBIRD_259_SC_IMAGE: &str = "jacobalberty/firebird:2.5.9-sc";
const FIREBIRD_259_SS_IMAGE: &str = "jacobalberty/firebird:2.5.9-ss";
const FIREBIRD_PROJECT_IMAGE: &str = "firebirdsql/firebird:5.0.1";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn run_test_query(info: &ConnectionInfo) -> Result<Option<(i32,)>, FbError> {
    let mut conn = rsfbclient::builder_pure_rust()
        .host(info.host.as_str())
        .port(info.port)
        .db_name(info.database.as_str())
        .user(info.username.as_str())
        .pass(info.password.as_str())
        .connect()?;
    conn.query_first(TEST_QUERY, ())
}

/// Log in with `info` and run the validation query.
async fn assert_login(info: ConnectionInfo) {
    let target = format!("{}@{}", info.username, info.fb_connection_string());
    let row = tokio::task::spawn_blocking(move || run_test_query(&info))
        .await
        .expect("query task panicked")
        .unwrap_or_else(|e| panic!("{target}: {e}"));
    assert_eq!(row, Some((1,)), "{target}");
}

/// Connection details for the administrative user.
async fn sysdba_info(firebird: &RunningFirebird, password: &str) -> ConnectionInfo {
    ConnectionInfo {
        username: "SYSDBA".into(),
        password: password.into(),
        ..firebird.connection_info().await.unwrap()
    }
}

async fn assert_reachable(firebird: &RunningFirebird) {
    let host = firebird.host().await.unwrap();
    let port = firebird.port().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), TcpStream::connect((host.as_str(), port)))
        .await
        .expect("connect timed out")
        .expect("connect failed");
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_default_image_starts() {
    init_tracing();
    let firebird = FirebirdImage::default().start().await.unwrap();

    assert_reachable(&firebird).await;
    let url = firebird.jdbc_url().await.unwrap();
    assert!(url.starts_with("jdbc:firebirdsql://"), "{url}");
    assert!(url.ends_with("/test"), "{url}");
    assert_login(firebird.connection_info().await.unwrap()).await;
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_with_sysdba_password() {
    init_tracing();
    let firebird = FirebirdImage::new(FIREBIRD_307_IMAGE)
        .unwrap()
        .with_sysdba_password("sysdbapassword")
        .start()
        .await
        .unwrap();

    let isc_password = firebird.runtime().env_var("ISC_PASSWORD").await.unwrap();
    assert_eq!(isc_password.as_deref(), Some("sysdbapassword"));

    assert_login(sysdba_info(&firebird, "sysdbapassword").await).await;
    assert_login(firebird.connection_info().await.unwrap()).await;
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_user_password_takes_precedence_over_sysdba_password() {
    init_tracing();
    let firebird = FirebirdImage::new(FIREBIRD_307_IMAGE)
        .unwrap()
        .with_username("sysdba")
        .with_password("password1")
        .with_sysdba_password("password2")
        .start()
        .await
        .unwrap();

    let runtime = firebird.runtime();
    assert_eq!(
        runtime.env_var("ISC_PASSWORD").await.unwrap().as_deref(),
        Some("password1")
    );
    assert_eq!(runtime.env_var("FIREBIRD_USER").await.unwrap(), None);

    assert_login(sysdba_info(&firebird, "password1").await).await;
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_with_enable_legacy_client_auth_url_default() {
    init_tracing();
    let firebird = FirebirdImage::new(FIREBIRD_307_IMAGE)
        .unwrap()
        .with_enable_legacy_client_auth()
        .start()
        .await
        .unwrap();

    let url = firebird.jdbc_url().await.unwrap();
    assert!(url.contains('?'), "{url}");
    assert!(url.contains("authPlugins=Srp256,Srp,Legacy_Auth"), "{url}");
    assert_login(firebird.connection_info().await.unwrap()).await;
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_with_enable_legacy_client_auth_url_explicit() {
    init_tracing();
    let firebird = FirebirdImage::new(FIREBIRD_307_IMAGE)
        .unwrap()
        .with_enable_legacy_client_auth()
        .with_url_param("authPlugins", "Legacy_Auth")
        .start()
        .await
        .unwrap();

    let url = firebird.jdbc_url().await.unwrap();
    assert!(url.contains("authPlugins=Legacy_Auth"), "{url}");
    assert!(!url.contains("Srp256"), "{url}");
    assert_login(firebird.connection_info().await.unwrap()).await;
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_with_enable_wire_crypt() {
    init_tracing();
    let firebird = FirebirdImage::new(FIREBIRD_307_IMAGE)
        .unwrap()
        .with_enable_wire_crypt()
        .start()
        .await
        .unwrap();

    assert_eq!(
        firebird.runtime().env_var("EnableWireCrypt").await.unwrap().as_deref(),
        Some("true")
    );
    assert_login(firebird.connection_info().await.unwrap()).await;
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_wire_crypt_downgrade_without_cipher_support() {
    init_tracing();
    let firebird = FirebirdImage::new(FIREBIRD_PROJECT_IMAGE)
        .unwrap()
        .with_cipher_policy(CipherPolicy::Limited(128))
        .start()
        .await
        .unwrap();

    assert_eq!(
        firebird
            .runtime()
            .env_var("FIREBIRD_CONF_WireCrypt")
            .await
            .unwrap()
            .as_deref(),
        Some("Enabled")
    );
    assert_login(firebird.connection_info().await.unwrap()).await;
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_259_images_use_absolute_path() {
    init_tracing();
    for reference in [FIREBIRD_259_SC_IMAGE, FIREBIRD_259_SS_IMAGE] {
        let image = FirebirdImage::new(reference).unwrap().with_database_name("test");
        assert_eq!(image.database_name(), "test", "before start");

        let firebird = image.start().await.unwrap();
        assert_eq!(firebird.database_name().await.unwrap(), "/firebird/data/test");
        assert_reachable(&firebird).await;
        assert_login(firebird.connection_info().await.unwrap()).await;
    }
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_project_image() {
    init_tracing();
    let firebird = FirebirdImage::new(FIREBIRD_PROJECT_IMAGE)
        .unwrap()
        .with_username("testuser")
        .with_password("testpassword")
        .start()
        .await
        .unwrap();

    assert_eq!(firebird.image().variant(), ImageVariant::Project);
    assert_eq!(
        firebird.database_name().await.unwrap(),
        "/var/lib/firebird/data/test"
    );
    let info = firebird.connection_info().await.unwrap();
    assert_eq!(info.username, "testuser");
    assert_reachable(&firebird).await;
    assert_login(info).await;
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_with_additional_url_params() {
    init_tracing();
    let firebird = FirebirdImage::default()
        .with_url_param("charSet", "utf-8")
        .with_url_param("blobBufferSize", "2048")
        .start()
        .await
        .unwrap();

    let url = firebird.jdbc_url().await.unwrap();
    assert!(url.contains('?'), "{url}");
    assert!(url.contains('&'), "{url}");
    assert!(url.contains("charSet=utf-8"), "{url}");
    assert!(url.contains("blobBufferSize=2048"), "{url}");
    assert_login(firebird.connection_info().await.unwrap()).await;
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_start_from_tc_url() {
    init_tracing();
    let firebird = firebird_testing::start_from_tc_url(
        "jdbc:tc:firebird:3.0.7://hostname/databasename?user=someuser&password=somepwd&charSet=utf-8",
    )
    .await
    .unwrap();

    assert_eq!(firebird.username(), "someuser");
    let url = firebird.jdbc_url().await.unwrap();
    assert!(url.ends_with("/databasename?charSet=utf-8"), "{url}");
    assert_login(firebird.connection_info().await.unwrap()).await;
}
