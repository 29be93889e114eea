//! Artifact download with remote-URL fallback.

use std::time::{SystemTime, UNIX_EPOCH};

use mugshot_api::Transport;
use tracing::{info, warn};

use crate::error::WorkflowError;
use crate::id::generate_id;

/// A fetched artifact, ready to be saved by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArtifact {
    /// `mugshot_result_<id>.jpg`.
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub source_url: String,
}

/// Result of a download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(DownloadedArtifact),
    /// Fetching failed; the front end should present the remote URL directly.
    OpenRemote { url: String, reason: String },
}

/// Appends a `t=<millis>` cache-buster to `url`.
pub fn cache_busted(url: &str, millis: u128) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}t={millis}")
}

/// Local file name for a downloaded result.
pub fn result_file_name() -> String {
    format!("mugshot_result_{}.jpg", generate_id(8))
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Fetches the artifact bytes, bypassing caches.
pub async fn fetch_artifact(
    transport: &dyn Transport,
    url: &str,
) -> Result<DownloadedArtifact, WorkflowError> {
    let bytes = transport
        .fetch_bytes(&cache_busted(url, now_millis()))
        .await
        .map_err(WorkflowError::DownloadFailed)?;

    Ok(DownloadedArtifact {
        file_name: result_file_name(),
        bytes,
        source_url: url.to_string(),
    })
}

/// Downloads the artifact, falling back to its remote URL on failure.
pub async fn download(transport: &dyn Transport, url: &str) -> DownloadOutcome {
    match fetch_artifact(transport, url).await {
        Ok(artifact) => {
            info!(file = %artifact.file_name, bytes = artifact.bytes.len(), "artifact downloaded");
            DownloadOutcome::Saved(artifact)
        }
        Err(e) => {
            warn!(url, error = %e, "direct download failed, falling back to remote URL");
            DownloadOutcome::OpenRemote {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}
