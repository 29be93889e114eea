//! Upload → submit → poll → resolve workflow for the mugshot effect.
//!
//! This crate holds the **control flow** between a selected image and a
//! finished artifact. It has no UI dependency: front ends drive a
//! [`Workflow`] through explicit commands and read its [`WorkflowState`].
//!
//! # Pipeline
//!
//! 1. **Upload**: obtain a write slot, PUT the bytes, derive the public URL
//! 2. **Submit**: create a generation job referencing the upload
//! 3. **Poll**: check job status on a fixed interval until it resolves
//! 4. **Download**: fetch the artifact, or fall back to its remote URL

pub mod download;
pub mod error;
pub mod id;
pub mod job;
#[cfg(test)]
mod mock;
pub mod session;
pub mod state;
pub mod types;
pub mod upload;

pub use download::{DownloadOutcome, DownloadedArtifact};
pub use error::{UploadStage, WorkflowError};
pub use job::{JobRunner, progress_percent};
pub use session::{Workflow, WorkflowSettings};
pub use state::{GenerateAction, InvalidTransition, Phase, WorkflowState};
pub use types::{GenerationJob, PollConfig, PollProgress, SourceFile, UploadTask, WorkflowEvent};
pub use upload::Uploader;
