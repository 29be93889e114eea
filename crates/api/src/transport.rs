//! The `Transport` seam between workflow logic and HTTP.

use std::future::Future;
use std::pin::Pin;

use crate::error::TransportError;
use crate::types::{JobRequest, JobStatusResponse, SubmittedJob};

/// Boxed future returned by every [`Transport`] call.
pub type TransportFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send + 'a>>;

/// Remote calls the workflow relies on.
///
/// [`HttpTransport`](crate::HttpTransport) is the production implementation.
/// Implementations copy whatever they need out of borrowed arguments before
/// returning the future, so the future only borrows `self`.
pub trait Transport: Send + Sync {
    /// Asks for a writable destination for `file_name`. Returns the write URL.
    fn request_upload_slot(&self, file_name: &str) -> TransportFuture<'_, String>;

    /// Writes `bytes` to a URL obtained from [`request_upload_slot`](Self::request_upload_slot).
    fn put_bytes(
        &self,
        write_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> TransportFuture<'_, ()>;

    /// Submits a generation job.
    fn submit_job(&self, request: &JobRequest) -> TransportFuture<'_, SubmittedJob>;

    /// Fetches the current status of a job.
    fn fetch_job_status(&self, job_id: &str) -> TransportFuture<'_, JobStatusResponse>;

    /// Fetches an arbitrary URL as raw bytes.
    fn fetch_bytes(&self, url: &str) -> TransportFuture<'_, Vec<u8>>;
}
