use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::errors::TransportError;

use super::ArtifactTransport;

/// Copies artifacts with `scp` and aliases them with `ssh ... ln -sf`.
///
/// Relies on non-interactive key authentication for `host`.
#[derive(Debug, Clone)]
pub struct SshTransport {
    host: String,
    directory: String,
}

impl SshTransport {
    pub fn new(host: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            directory: directory.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn remote_path(&self, name: &str) -> String {
        format!("{}/{}", self.directory, name)
    }

    fn store_command(&self, staged: &Path, name: &str) -> Command {
        let mut command = Command::new("scp");
        command
            .arg("-p")
            .arg(staged)
            .arg(format!("{}:{}", self.host, self.remote_path(name)));
        command
    }

    fn symlink_command(&self, name: &str, alias: &str) -> Command {
        let mut command = Command::new("ssh");
        command
            .arg(&self.host)
            .arg("ln")
            .arg("-sf")
            .arg(self.remote_path(name))
            .arg(self.remote_path(alias));
        command
    }
}

async fn run(program: &'static str, mut command: Command) -> Result<(), TransportError> {
    let status = command
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|source| TransportError::Spawn { program, source })?;

    if !status.success() {
        return Err(TransportError::Command { program, status });
    }

    Ok(())
}

#[async_trait]
impl ArtifactTransport for SshTransport {
    async fn store(&self, staged: &Path, name: &str) -> Result<(), TransportError> {
        run("scp", self.store_command(staged, name)).await
    }

    async fn symlink(&self, name: &str, alias: &str) -> Result<(), TransportError> {
        run("ssh", self.symlink_command(name, alias)).await
    }
}
