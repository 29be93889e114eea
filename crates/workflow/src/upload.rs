//! Upload coordinator: slot → transfer → public reference.

use mugshot_api::Transport;
use tracing::{debug, info};

use crate::error::{UploadStage, WorkflowError};
use crate::id::{DEFAULT_ID_LEN, generate_id};
use crate::types::{SourceFile, UploadTask};

/// Extension used when the original name has none.
const DEFAULT_EXTENSION: &str = "jpg";

/// Uploads user files and resolves their public URL.
pub struct Uploader<'a> {
    transport: &'a dyn Transport,
    content_base: &'a str,
}

impl<'a> Uploader<'a> {
    pub fn new(transport: &'a dyn Transport, content_base: &'a str) -> Self {
        Self {
            transport,
            content_base,
        }
    }

    /// Uploads `file` under a fresh unique name.
    ///
    /// Two network calls: request a write slot, then PUT the bytes.
    /// The public reference is derived locally.
    pub async fn upload(&self, file: SourceFile) -> Result<UploadTask, WorkflowError> {
        let generated_file_name = generated_file_name(&file.name);

        let destination_url = self
            .transport
            .request_upload_slot(&generated_file_name)
            .await
            .map_err(|source| WorkflowError::UploadFailed {
                stage: UploadStage::Slot,
                source,
            })?;
        debug!(file = %generated_file_name, "got upload slot");

        let size = file.bytes.len();
        self.transport
            .put_bytes(&destination_url, file.bytes, &file.mime_type)
            .await
            .map_err(|source| WorkflowError::UploadFailed {
                stage: UploadStage::Transfer,
                source,
            })?;

        let public_reference = public_reference(self.content_base, &generated_file_name);
        info!(file = %generated_file_name, bytes = size, url = %public_reference, "upload complete");

        Ok(UploadTask {
            source_name: file.name,
            mime_type: file.mime_type,
            generated_file_name,
            destination_url,
            public_reference,
        })
    }
}

/// Extension of `name` (text after the last dot), or `jpg`.
pub fn extension_for(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => DEFAULT_EXTENSION,
    }
}

/// `<random id>.<extension of name>`.
pub fn generated_file_name(name: &str) -> String {
    format!("{}.{}", generate_id(DEFAULT_ID_LEN), extension_for(name))
}

/// Public read URL for an uploaded file.
pub fn public_reference(content_base: &str, generated_file_name: &str) -> String {
    format!("{}/{}", content_base.trim_end_matches('/'), generated_file_name)
}
