//! Drives one select → generate → download run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mugshot_api::HttpTransport;
use mugshot_workflow::{DownloadOutcome, SourceFile, Workflow, WorkflowEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;

/// What the user asked for on the command line.
#[derive(Debug, Clone)]
pub struct Options {
    pub image: PathBuf,
    pub output_dir: PathBuf,
    pub download: bool,
}

/// Runs the workflow for one image.
pub async fn run(config: Config, options: Options) -> anyhow::Result<()> {
    let transport = Arc::new(HttpTransport::new(config.endpoints())?);
    let workflow = Workflow::new(transport, config.workflow_settings());

    let events = workflow
        .take_events()
        .ok_or_else(|| anyhow::anyhow!("workflow events already taken"))?;
    let reporter = tokio::spawn(report_events(events));

    let result = execute(&workflow, &options).await;

    drop(workflow);
    let _ = reporter.await;
    result
}

async fn execute(workflow: &Workflow, options: &Options) -> anyhow::Result<()> {
    let file = SourceFile::from_path(&options.image).await?;
    workflow.select_file(file).await?;

    let artifact = workflow.generate().await?;
    println!("{artifact}");

    if !options.download {
        return Ok(());
    }

    match workflow.download().await? {
        DownloadOutcome::Saved(artifact) => {
            let path = save(&options.output_dir, &artifact.file_name, &artifact.bytes).await?;
            println!("saved {}", path.display());
        }
        DownloadOutcome::OpenRemote { url, reason } => {
            warn!(%reason, "direct download failed");
            println!("direct download failed, open {url}");
        }
    }

    Ok(())
}

async fn save(dir: &Path, file_name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "result written");
    Ok(path)
}

/// Logs status line changes and poll progress until the workflow is dropped.
async fn report_events(mut events: mpsc::Receiver<WorkflowEvent>) {
    let mut last_status = String::new();
    while let Some(event) = events.recv().await {
        match event {
            WorkflowEvent::StateChanged(state) => {
                let status = state.status_text();
                if status != last_status && !status.is_empty() {
                    info!(phase = %state.phase(), "{status}");
                }
                if let Some(error) = state.last_error() {
                    debug!(%error, "last error");
                }
                last_status = status;
            }
            WorkflowEvent::Progress(progress) => {
                debug!(attempt = progress.attempt, percent = progress.percent, "poll progress");
            }
        }
    }
}
