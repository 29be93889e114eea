//! Data types for the workflow.

use std::path::Path;
use std::time::Duration;

use mugshot_api::JobStatus;

use crate::state::WorkflowState;

/// MIME type sent when the extension is not a known image type.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, deriving its MIME type from the extension.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = detect_content_type(&name).unwrap_or(FALLBACK_CONTENT_TYPE);

        Ok(Self::new(name, mime_type, bytes))
    }
}

/// Detects an image MIME type from a file name's extension.
pub fn detect_content_type(name: &str) -> Option<&'static str> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("webp") => Some("image/webp"),
        Some("gif") => Some("image/gif"),
        Some("heic") => Some("image/heic"),
        _ => None,
    }
}

/// A finished upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub source_name: String,
    pub mime_type: String,
    /// `<id>.<ext>`, unique per upload.
    pub generated_file_name: String,
    /// Write target granted by the server. Used once.
    pub destination_url: String,
    /// Read location, derived from `generated_file_name`.
    pub public_reference: String,
}

/// A submitted generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub job_id: String,
    pub source_reference: String,
    pub status: JobStatus,
    pub result_reference: Option<String>,
}

/// Status polling schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 60,
        }
    }
}

/// Progress reported after each non-terminal status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollProgress {
    /// 1-based status check number.
    pub attempt: u32,
    pub percent: u8,
}

/// Event emitted by a [`Workflow`](crate::Workflow).
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    /// A transition was applied. Carries the new state.
    StateChanged(WorkflowState),
    /// A status check came back non-terminal.
    Progress(PollProgress),
}
