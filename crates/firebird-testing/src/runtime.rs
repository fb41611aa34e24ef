//! Access to a running container.
//!
//! [`RunningFirebird`](crate::RunningFirebird) only needs a handful of
//! queries against the container. They are collected in [`ContainerRuntime`]
//! so the connection logic can be exercised without Docker.

use async_trait::async_trait;
use testcontainers::core::{ExecCommand, IntoContainerPort};
use testcontainers::{ContainerAsync, Image};

use crate::error::Error;

/// Queries against a started container.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Host on which mapped ports are reachable.
    async fn host(&self) -> Result<String, Error>;

    /// Host port mapped to a container TCP port.
    async fn mapped_port(&self, port: u16) -> Result<u16, Error>;

    /// Value of an environment variable in the container, `None` when unset or empty.
    async fn env_var(&self, name: &str) -> Result<Option<String>, Error>;

    /// Whether a process inside the container listens on a TCP port.
    async fn is_port_listening(&self, port: u16) -> Result<bool, Error>;
}

/// Shell snippet printing `listening` when `port` is in LISTEN state.
///
/// Reads `/proc/net/tcp{,6}` so it works in images without netstat or ss.
fn listening_check(port: u16) -> String {
    format!(
        "grep -qiE ':{port:04X} [0-9A-F]+:[0-9A-F]+ 0A' /proc/net/tcp /proc/net/tcp6 2>/dev/null \
         && echo listening"
    )
}

async fn exec_stdout<I: Image>(container: &ContainerAsync<I>, cmd: Vec<String>) -> Result<String, Error> {
    let mut result = container.exec(ExecCommand::new(cmd)).await?;
    let stdout = result
        .stdout_to_vec()
        .await
        .map_err(|e| Error::Exec(e.to_string()))?;
    Ok(String::from_utf8_lossy(&stdout).trim().to_string())
}

#[async_trait]
impl<I: Image> ContainerRuntime for ContainerAsync<I> {
    async fn host(&self) -> Result<String, Error> {
        Ok(self.get_host().await?.to_string())
    }

    async fn mapped_port(&self, port: u16) -> Result<u16, Error> {
        Ok(self.get_host_port_ipv4(port.tcp()).await?)
    }

    async fn env_var(&self, name: &str) -> Result<Option<String>, Error> {
        let value = exec_stdout(self, vec!["printenv".into(), name.into()]).await?;
        Ok((!value.is_empty()).then_some(value))
    }

    async fn is_port_listening(&self, port: u16) -> Result<bool, Error> {
        let cmd = vec!["sh".into(), "-c".into(), listening_check(port)];
        Ok(exec_stdout(self, cmd).await? == "listening")
    }
}
