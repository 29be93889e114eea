//! Workflow state machine.
//!
//! ```text
//! idle ──select──▶ uploading ──ok──▶ ready ──generate──▶ submitting ──ok──▶ processing
//!                      │                                     │                 │
//!                      └──────────fail──────▶ error ◀──fail──┴───fail/timeout──┤
//!                                               │                              ▼
//!                                               └──generate──▶ ...        complete
//! ```
//!
//! `reset` returns any state to `idle`. Transitions validate first and only
//! then mutate, so a rejected transition leaves the state untouched.

use std::fmt;

use serde::Serialize;

/// User-visible phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
    Ready,
    Submitting,
    Processing,
    Complete,
    Error,
}

impl Phase {
    /// Whether a remote operation is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Uploading | Phase::Submitting | Phase::Processing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Uploading => "uploading",
            Phase::Ready => "ready",
            Phase::Submitting => "submitting",
            Phase::Processing => "processing",
            Phase::Complete => "complete",
            Phase::Error => "error",
        };
        f.write_str(s)
    }
}

/// A transition that is not allowed from the current phase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} while {from}")]
pub struct InvalidTransition {
    pub from: Phase,
    pub action: &'static str,
}

/// Generate button binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateAction {
    pub enabled: bool,
    pub label: String,
}

/// The single source of truth for UI bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowState {
    phase: Phase,
    uploaded_reference: Option<String>,
    artifact_reference: Option<String>,
    last_error: Option<String>,
    progress: Option<u8>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn uploaded_reference(&self) -> Option<&str> {
        self.uploaded_reference.as_deref()
    }

    pub fn artifact_reference(&self) -> Option<&str> {
        self.artifact_reference.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Last reported poll percentage while processing.
    pub fn progress(&self) -> Option<u8> {
        self.progress
    }

    /// Generate is allowed only with an upload and nothing in flight.
    pub fn can_generate(&self) -> bool {
        matches!(self.phase, Phase::Ready | Phase::Complete | Phase::Error)
            && self.uploaded_reference.is_some()
    }

    pub fn generate_action(&self) -> GenerateAction {
        let label = match self.phase {
            Phase::Idle | Phase::Ready | Phase::Error => "GENERATE MUGSHOT".to_string(),
            Phase::Complete => "GENERATE AGAIN".to_string(),
            Phase::Uploading | Phase::Submitting | Phase::Processing => self.status_text(),
        };
        GenerateAction {
            enabled: self.can_generate(),
            label,
        }
    }

    /// Status line text.
    pub fn status_text(&self) -> String {
        match self.phase {
            Phase::Idle => String::new(),
            Phase::Uploading => "UPLOADING...".into(),
            Phase::Ready => "READY".into(),
            Phase::Submitting => "SUBMITTING JOB...".into(),
            Phase::Processing => match self.progress {
                Some(p) => format!("PROCESSING... {p}%"),
                None => "PROCESSING...".into(),
            },
            Phase::Complete => "COMPLETE".into(),
            Phase::Error => "ERROR".into(),
        }
    }

    fn reject(&self, action: &'static str) -> InvalidTransition {
        InvalidTransition {
            from: self.phase,
            action,
        }
    }

    fn expect(&self, phase: Phase, action: &'static str) -> Result<(), InvalidTransition> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(self.reject(action))
        }
    }

    /// A file was selected. Discards any previous upload and result.
    pub fn begin_upload(&mut self) -> Result<(), InvalidTransition> {
        if self.phase.is_busy() {
            return Err(self.reject("select a file"));
        }
        *self = Self {
            phase: Phase::Uploading,
            ..Self::default()
        };
        Ok(())
    }

    pub fn upload_succeeded(&mut self, reference: String) -> Result<(), InvalidTransition> {
        self.expect(Phase::Uploading, "finish an upload")?;
        self.phase = Phase::Ready;
        self.uploaded_reference = Some(reference);
        Ok(())
    }

    /// Generate was triggered. Returns the uploaded reference to submit.
    pub fn begin_generate(&mut self) -> Result<String, InvalidTransition> {
        let reference = match (&self.uploaded_reference, self.can_generate()) {
            (Some(r), true) => r.clone(),
            _ => return Err(self.reject("generate")),
        };
        self.phase = Phase::Submitting;
        self.artifact_reference = None;
        self.last_error = None;
        self.progress = None;
        Ok(reference)
    }

    pub fn submit_succeeded(&mut self) -> Result<(), InvalidTransition> {
        self.expect(Phase::Submitting, "start processing")?;
        self.phase = Phase::Processing;
        Ok(())
    }

    /// Updates progress text. The phase does not change.
    pub fn report_progress(&mut self, percent: u8) -> Result<(), InvalidTransition> {
        self.expect(Phase::Processing, "report progress")?;
        self.progress = Some(percent);
        Ok(())
    }

    pub fn job_completed(&mut self, artifact: String) -> Result<(), InvalidTransition> {
        self.expect(Phase::Processing, "complete a job")?;
        self.phase = Phase::Complete;
        self.artifact_reference = Some(artifact);
        self.progress = None;
        Ok(())
    }

    /// The in-flight operation failed.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), InvalidTransition> {
        if !self.phase.is_busy() {
            return Err(self.reject("fail"));
        }
        self.phase = Phase::Error;
        self.last_error = Some(message.into());
        self.artifact_reference = None;
        self.progress = None;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
