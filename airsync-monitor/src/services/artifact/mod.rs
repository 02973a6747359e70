mod local;
mod ssh;

pub use local::*;
pub use ssh::*;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use airsync_api::Channel;
use async_trait::async_trait;
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

use crate::errors::TransportError;

const DATE_STAMP_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// `YYYY-MM-DD` of `timestamp` in its own offset.
pub fn date_stamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(DATE_STAMP_FORMAT)
        .unwrap_or_else(|_| timestamp.date().to_string())
}

/// Where a chart ends up: a dated name plus a stable alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub stored: String,
    pub alias: String,
}

impl ArtifactNames {
    pub fn new(channel: Channel, date_stamp: &str) -> Self {
        Self {
            stored: format!("{}-{}.png", channel.id(), date_stamp),
            alias: format!("{}-today.png", channel.id()),
        }
    }
}

/// Moves staged files to the presentation host.
#[async_trait]
pub trait ArtifactTransport: Send + Sync {
    /// Copy the file at `staged` so it is available as `name`.
    async fn store(&self, staged: &Path, name: &str) -> Result<(), TransportError>;

    /// Point `alias` at the previously stored `name`, replacing any old alias.
    async fn symlink(&self, name: &str, alias: &str) -> Result<(), TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutcome {
    pub names: ArtifactNames,
    pub stored: bool,
    pub aliased: bool,
}

impl ArtifactOutcome {
    pub fn is_published(&self) -> bool {
        self.stored && self.aliased
    }
}

pub struct ArtifactPublisher {
    transport: Arc<dyn ArtifactTransport>,
    timeout: Duration,
}

impl ArtifactPublisher {
    pub fn new(transport: Arc<dyn ArtifactTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Stage, store and alias one rendered chart.
    ///
    /// A failed store skips the alias. A failed alias leaves the stored file in place.
    pub async fn publish(&self, channel: Channel, date_stamp: &str, bytes: &[u8]) -> ArtifactOutcome {
        let names = ArtifactNames::new(channel, date_stamp);
        let mut outcome = ArtifactOutcome {
            names,
            stored: false,
            aliased: false,
        };

        let staged = match stage(bytes) {
            Ok(staged) => staged,
            Err(e) => {
                tracing::error!(channel = %channel, "{}", TransportError::Staging(e));
                return outcome;
            }
        };

        let stored = self
            .bounded(self.transport.store(staged.path(), &outcome.names.stored))
            .await;

        match stored {
            Ok(()) => {
                outcome.stored = true;
                tracing::debug!(channel = %channel, "stored {}", outcome.names.stored);

                let aliased = self
                    .bounded(self.transport.symlink(&outcome.names.stored, &outcome.names.alias))
                    .await;

                match aliased {
                    Ok(()) => outcome.aliased = true,
                    Err(e) => tracing::error!(
                        channel = %channel,
                        "Failed to point {} at {}: {}",
                        outcome.names.alias,
                        outcome.names.stored,
                        e
                    ),
                }
            }
            Err(e) => tracing::error!(channel = %channel, "Failed to store {}: {}", outcome.names.stored, e),
        }

        if let Err(e) = staged.close() {
            tracing::warn!(channel = %channel, "Failed to remove staged chart: {}", e);
        }

        outcome
    }

    async fn bounded<F>(&self, call: F) -> Result<(), TransportError>
    where
        F: Future<Output = Result<(), TransportError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or(Err(TransportError::Timeout(self.timeout)))
    }
}

/// Write `bytes` to a world-readable scratch file.
fn stage(bytes: &[u8]) -> io::Result<NamedTempFile> {
    let mut staged = tempfile::Builder::new()
        .prefix("airsync-")
        .suffix(".png")
        .tempfile()?;

    staged.write_all(bytes)?;
    staged.flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o666))?;
    }

    Ok(staged)
}
