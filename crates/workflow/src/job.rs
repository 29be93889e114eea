//! Job submission and status polling.

use std::ops::ControlFlow;

use mugshot_api::{JobRequest, JobStatus, JobStatusResponse, Transport};
use tracing::{debug, info, warn};

use crate::error::WorkflowError;
use crate::types::{GenerationJob, PollConfig, PollProgress};

/// Message used when a failed job carries no error text.
const GENERIC_FAILURE: &str = "Job processing failed";

/// Percentage shown after the `attempt_index`-th (0-based) non-terminal check.
///
/// `min(99, floor((attempt_index + 1) / 10 * 100))`, i.e. ten points per
/// check, never reaching 100 before the job actually completes.
pub fn progress_percent(attempt_index: u32) -> u8 {
    (u64::from(attempt_index) + 1).saturating_mul(10).min(99) as u8
}

/// Pulls the artifact URL out of a completed status response.
pub fn extract_artifact(status: &JobStatusResponse) -> Result<String, WorkflowError> {
    status
        .artifact_location()
        .map(str::to_owned)
        .ok_or(WorkflowError::MissingArtifact)
}

/// Runs one generation job against a transport.
pub struct JobRunner<'a> {
    transport: &'a dyn Transport,
    config: PollConfig,
}

impl<'a> JobRunner<'a> {
    pub fn new(transport: &'a dyn Transport, config: PollConfig) -> Self {
        Self { transport, config }
    }

    /// Submits the mugshot effect for an uploaded image.
    pub async fn submit(&self, public_reference: &str) -> Result<GenerationJob, WorkflowError> {
        let request = JobRequest::for_image(public_reference);
        let submitted = self
            .transport
            .submit_job(&request)
            .await
            .map_err(WorkflowError::SubmissionFailed)?;

        info!(job_id = %submitted.job_id, "job submitted");

        Ok(GenerationJob {
            job_id: submitted.job_id,
            source_reference: public_reference.to_string(),
            status: JobStatus::Submitted,
            result_reference: None,
        })
    }

    /// Polls until the job resolves and returns it with its final status
    /// and, when completed, its `result_reference`.
    ///
    /// Checks are strictly sequential. After each non-terminal check,
    /// `on_progress` is called and the loop sleeps one interval; returning
    /// `ControlFlow::Break` from the callback abandons the job with
    /// [`WorkflowError::Superseded`]. A transport error aborts immediately.
    pub async fn poll<F>(
        &self,
        mut job: GenerationJob,
        mut on_progress: F,
    ) -> Result<GenerationJob, WorkflowError>
    where
        F: FnMut(PollProgress) -> ControlFlow<()>,
    {
        for attempt in 0..self.config.max_attempts {
            let status = self
                .transport
                .fetch_job_status(&job.job_id)
                .await
                .map_err(WorkflowError::StatusCheckFailed)?;

            debug!(job_id = %job.job_id, attempt = attempt + 1, status = %status.status, "polled job");
            job.status = status.state();

            if !job.status.is_terminal() {
                let progress = PollProgress {
                    attempt: attempt + 1,
                    percent: progress_percent(attempt),
                };
                if on_progress(progress).is_break() {
                    debug!(job_id = %job.job_id, "job superseded, polling stopped");
                    return Err(WorkflowError::Superseded);
                }
                tokio::time::sleep(self.config.interval).await;
                continue;
            }

            if job.status == JobStatus::Failed {
                let message = status
                    .error_message()
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                warn!(job_id = %job.job_id, error = %message, "job failed");
                return Err(WorkflowError::JobFailed { message });
            }

            let artifact = extract_artifact(&status)?;
            info!(job_id = %job.job_id, attempts = attempt + 1, url = %artifact, "job completed");
            job.result_reference = Some(artifact);
            return Ok(job);
        }

        Err(WorkflowError::JobTimedOut {
            attempts: self.config.max_attempts,
        })
    }
}
