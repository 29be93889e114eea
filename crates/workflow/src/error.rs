//! Workflow error types.

use std::fmt;

use mugshot_api::TransportError;

use crate::state::InvalidTransition;

/// Which half of an upload failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    /// Requesting the write destination.
    Slot,
    /// Transferring the bytes.
    Transfer,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStage::Slot => f.write_str("slot"),
            UploadStage::Transfer => f.write_str("transfer"),
        }
    }
}

/// Errors produced while running the workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("upload failed ({stage}): {source}")]
    UploadFailed {
        stage: UploadStage,
        source: TransportError,
    },

    #[error("job submission failed: {0}")]
    SubmissionFailed(#[source] TransportError),

    #[error("status check failed: {0}")]
    StatusCheckFailed(#[source] TransportError),

    #[error("no image URL in response")]
    MissingArtifact,

    #[error("{message}")]
    JobFailed { message: String },

    #[error("job timed out after {attempts} status checks")]
    JobTimedOut { attempts: u32 },

    #[error("download failed: {0}")]
    DownloadFailed(#[source] TransportError),

    #[error(transparent)]
    State(#[from] InvalidTransition),

    /// A newer command or a reset replaced the one this result belongs to.
    #[error("superseded by a newer action")]
    Superseded,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
