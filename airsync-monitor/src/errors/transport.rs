use std::io;
use std::process::ExitStatus;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to stage artifact: {0}")]
    Staging(#[source] io::Error),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}")]
    Command {
        program: &'static str,
        status: ExitStatus,
    },

    #[error("Filesystem error: {0}")]
    Io(#[from] io::Error),

    #[error("Artifact transfer timed out after {0:?}")]
    Timeout(Duration),
}
