//! Command surface over the workflow state.
//!
//! [`Workflow`] owns the single [`WorkflowState`] and exposes the commands a
//! front end invokes: `select_file`, `generate`, `reset` and `download`.
//!
//! Every `select_file` and `generate` takes a generation token when it
//! starts. `reset` and later commands advance the generation, so a result
//! that arrives for an older token is dropped instead of overwriting the
//! newer state. The token check and the transition happen under one lock.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mugshot_api::Transport;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

use crate::download::{self, DownloadOutcome};
use crate::error::WorkflowError;
use crate::job::JobRunner;
use crate::state::{GenerateAction, InvalidTransition, WorkflowState};
use crate::types::{PollConfig, PollProgress, SourceFile, WorkflowEvent};
use crate::upload::Uploader;

const EVENT_CAPACITY: usize = 256;

/// Settings for a [`Workflow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Public base URL uploaded files are readable from.
    pub content_base: String,
    pub poll: PollConfig,
}

struct Shared {
    state: WorkflowState,
    generation: u64,
}

/// The upload → generate workflow for one user session.
pub struct Workflow {
    transport: Arc<dyn Transport>,
    settings: WorkflowSettings,
    shared: Mutex<Shared>,
    events_tx: mpsc::Sender<WorkflowEvent>,
    events_rx: Mutex<Option<mpsc::Receiver<WorkflowEvent>>>,
}

impl Workflow {
    pub fn new(transport: Arc<dyn Transport>, settings: WorkflowSettings) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
        Self {
            transport,
            settings,
            shared: Mutex::new(Shared {
                state: WorkflowState::new(),
                generation: 0,
            }),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&self) -> Option<mpsc::Receiver<WorkflowEvent>> {
        self.events_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> WorkflowState {
        self.lock().state.clone()
    }

    pub fn generate_action(&self) -> GenerateAction {
        self.lock().state.generate_action()
    }

    /// Uploads a newly selected file. Returns its public reference.
    pub async fn select_file(&self, file: SourceFile) -> Result<String, WorkflowError> {
        let ((), token) = self.begin(WorkflowState::begin_upload)?;
        info!(file = %file.name, bytes = file.bytes.len(), "file selected");

        let uploader = Uploader::new(self.transport.as_ref(), &self.settings.content_base);
        match uploader.upload(file).await {
            Ok(task) => {
                let reference = task.public_reference;
                self.commit(token, |s| s.upload_succeeded(reference.clone()))?;
                Ok(reference)
            }
            Err(e) => Err(self.abort(token, e)),
        }
    }

    /// Submits a job for the uploaded file and waits for its artifact.
    pub async fn generate(&self) -> Result<String, WorkflowError> {
        let (reference, token) = self.begin(WorkflowState::begin_generate)?;

        let runner = JobRunner::new(self.transport.as_ref(), self.settings.poll.clone());
        match self.run_job(&runner, &reference, token).await {
            Ok(artifact) => Ok(artifact),
            Err(e) => Err(self.abort(token, e)),
        }
    }

    async fn run_job(
        &self,
        runner: &JobRunner<'_>,
        reference: &str,
        token: u64,
    ) -> Result<String, WorkflowError> {
        let job = runner.submit(reference).await?;
        self.commit(token, WorkflowState::submit_succeeded)?;

        let job = runner
            .poll(job, |progress| self.apply_progress(token, progress))
            .await?;
        let artifact = job.result_reference.ok_or(WorkflowError::MissingArtifact)?;

        self.commit(token, |s| s.job_completed(artifact.clone()))?;
        Ok(artifact)
    }

    /// Returns to idle and orphans any in-flight command.
    pub fn reset(&self) {
        let mut shared = self.lock();
        shared.generation += 1;
        shared.state.reset();
        self.emit(WorkflowEvent::StateChanged(shared.state.clone()));
        info!("workflow reset");
    }

    /// Downloads the current artifact.
    ///
    /// Fetch failures are not errors: they yield
    /// [`DownloadOutcome::OpenRemote`]. Fails only when there is no artifact.
    pub async fn download(&self) -> Result<DownloadOutcome, WorkflowError> {
        let url = self
            .state()
            .artifact_reference()
            .map(str::to_owned)
            .ok_or(WorkflowError::MissingArtifact)?;

        Ok(download::download(self.transport.as_ref(), &url).await)
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: WorkflowEvent) {
        if let Err(e) = self.events_tx.try_send(event) {
            trace!("workflow event dropped: {e}");
        }
    }

    /// Applies a starting transition and opens a new generation.
    fn begin<T>(
        &self,
        transition: impl FnOnce(&mut WorkflowState) -> Result<T, InvalidTransition>,
    ) -> Result<(T, u64), WorkflowError> {
        let mut shared = self.lock();
        let out = transition(&mut shared.state)?;
        shared.generation += 1;
        self.emit(WorkflowEvent::StateChanged(shared.state.clone()));
        Ok((out, shared.generation))
    }

    /// Applies a transition if `token` is still the current generation.
    fn commit<T>(
        &self,
        token: u64,
        transition: impl FnOnce(&mut WorkflowState) -> Result<T, InvalidTransition>,
    ) -> Result<T, WorkflowError> {
        let mut shared = self.lock();
        if shared.generation != token {
            return Err(WorkflowError::Superseded);
        }
        let out = transition(&mut shared.state)?;
        self.emit(WorkflowEvent::StateChanged(shared.state.clone()));
        Ok(out)
    }

    fn apply_progress(&self, token: u64, progress: PollProgress) -> ControlFlow<()> {
        match self.commit(token, |s| s.report_progress(progress.percent)) {
            Ok(()) => {
                self.emit(WorkflowEvent::Progress(progress));
                ControlFlow::Continue(())
            }
            Err(_) => ControlFlow::Break(()),
        }
    }

    /// Moves the state to `error` for a failed command and hands the error back.
    ///
    /// Stale failures leave the state alone and come back as `Superseded`.
    fn abort(&self, token: u64, err: WorkflowError) -> WorkflowError {
        if matches!(err, WorkflowError::Superseded) {
            return err;
        }
        match self.commit(token, |s| s.fail(err.to_string())) {
            Ok(()) => {
                error!(error = %err, "workflow step failed");
                err
            }
            Err(WorkflowError::Superseded) => {
                debug!(error = %err, "discarding failure of superseded command");
                WorkflowError::Superseded
            }
            Err(_) => err,
        }
    }
}
