//! Scripted [`Transport`] for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use mugshot_api::{
    JobRequest, JobStatusResponse, SubmittedJob, Transport, TransportError, TransportFuture,
};
use tokio::sync::Notify;

type Script<T> = Mutex<VecDeque<Result<T, TransportError>>>;

/// Returns queued responses in order and records every request.
///
/// An empty queue answers with `NetworkUnavailable`, except status checks,
/// which fall back to the response set with [`MockTransport::repeat_status`].
#[derive(Default)]
pub(crate) struct MockTransport {
    slots: Script<String>,
    puts: Script<()>,
    submits: Script<SubmittedJob>,
    statuses: Script<JobStatusResponse>,
    repeat_status: Mutex<Option<JobStatusResponse>>,
    fetches: Script<Vec<u8>>,
    submit_gate: Mutex<Option<Arc<Notify>>>,

    slot_requests: Mutex<Vec<String>>,
    put_requests: Mutex<Vec<(String, Vec<u8>, String)>>,
    submit_requests: Mutex<Vec<JobRequest>>,
    status_requests: Mutex<Vec<String>>,
    fetch_requests: Mutex<Vec<String>>,
}

fn next<T>(script: &Script<T>) -> Result<T, TransportError> {
    script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(TransportError::NetworkUnavailable("no mock response".into())))
}

/// Builds a status response from a JSON literal.
pub(crate) fn status(json: &str) -> JobStatusResponse {
    serde_json::from_str(json).unwrap()
}

pub(crate) fn job(id: &str) -> SubmittedJob {
    SubmittedJob {
        job_id: id.into(),
        extra: Default::default(),
    }
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_slot(&self, r: Result<String, TransportError>) {
        self.slots.lock().unwrap().push_back(r);
    }

    pub(crate) fn push_put(&self, r: Result<(), TransportError>) {
        self.puts.lock().unwrap().push_back(r);
    }

    pub(crate) fn push_submit(&self, r: Result<SubmittedJob, TransportError>) {
        self.submits.lock().unwrap().push_back(r);
    }

    pub(crate) fn push_status(&self, r: Result<JobStatusResponse, TransportError>) {
        self.statuses.lock().unwrap().push_back(r);
    }

    pub(crate) fn repeat_status(&self, resp: JobStatusResponse) {
        *self.repeat_status.lock().unwrap() = Some(resp);
    }

    pub(crate) fn push_fetch(&self, r: Result<Vec<u8>, TransportError>) {
        self.fetches.lock().unwrap().push_back(r);
    }

    /// Makes the next `submit_job` wait until the returned gate is notified.
    pub(crate) fn hold_submit(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.submit_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Scripts a successful upload.
    pub(crate) fn script_upload(&self) {
        self.push_slot(Ok("https://bucket.example/signed".into()));
        self.push_put(Ok(()));
    }

    pub(crate) fn slot_requests(&self) -> Vec<String> {
        self.slot_requests.lock().unwrap().clone()
    }

    pub(crate) fn put_requests(&self) -> Vec<(String, Vec<u8>, String)> {
        self.put_requests.lock().unwrap().clone()
    }

    pub(crate) fn submit_requests(&self) -> Vec<JobRequest> {
        self.submit_requests.lock().unwrap().clone()
    }

    pub(crate) fn status_requests(&self) -> Vec<String> {
        self.status_requests.lock().unwrap().clone()
    }

    pub(crate) fn fetch_requests(&self) -> Vec<String> {
        self.fetch_requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn request_upload_slot(&self, file_name: &str) -> TransportFuture<'_, String> {
        self.slot_requests.lock().unwrap().push(file_name.to_string());
        Box::pin(async move { next(&self.slots) })
    }

    fn put_bytes(
        &self,
        write_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> TransportFuture<'_, ()> {
        self.put_requests.lock().unwrap().push((
            write_url.to_string(),
            bytes,
            content_type.to_string(),
        ));
        Box::pin(async move { next(&self.puts) })
    }

    fn submit_job(&self, request: &JobRequest) -> TransportFuture<'_, SubmittedJob> {
        self.submit_requests.lock().unwrap().push(request.clone());
        let gate = self.submit_gate.lock().unwrap().take();
        Box::pin(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            next(&self.submits)
        })
    }

    fn fetch_job_status(&self, job_id: &str) -> TransportFuture<'_, JobStatusResponse> {
        self.status_requests.lock().unwrap().push(job_id.to_string());
        Box::pin(async move {
            let queued = self.statuses.lock().unwrap().pop_front();
            match queued {
                Some(r) => r,
                None => self.repeat_status.lock().unwrap().clone().ok_or_else(|| {
                    TransportError::NetworkUnavailable("no mock response".into())
                }),
            }
        })
    }

    fn fetch_bytes(&self, url: &str) -> TransportFuture<'_, Vec<u8>> {
        self.fetch_requests.lock().unwrap().push(url.to_string());
        Box::pin(async move { next(&self.fetches) })
    }
}
