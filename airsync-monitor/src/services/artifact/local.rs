use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::errors::TransportError;

use super::ArtifactTransport;

/// Publishes into a directory on this host.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    directory: PathBuf,
}

impl LocalTransport {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

async fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[async_trait]
impl ArtifactTransport for LocalTransport {
    async fn store(&self, staged: &Path, name: &str) -> Result<(), TransportError> {
        fs::create_dir_all(&self.directory).await?;
        fs::copy(staged, self.directory.join(name)).await?;

        Ok(())
    }

    async fn symlink(&self, name: &str, alias: &str) -> Result<(), TransportError> {
        let link = self.directory.join(alias);
        let pending = self.directory.join(format!(".{alias}.new"));

        remove_if_present(&pending).await?;

        // Relative target, so the directory can be moved or served as is
        #[cfg(unix)]
        fs::symlink(name, &pending).await?;
        #[cfg(not(unix))]
        fs::copy(self.directory.join(name), &pending).await?;

        fs::rename(&pending, &link).await?;

        Ok(())
    }
}
