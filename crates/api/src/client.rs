//! Image-effect API client.
//!
//! Async HTTP client using `reqwest`. Non-2xx responses become
//! [`TransportError::RequestFailed`]; failures without a response become
//! [`TransportError::NetworkUnavailable`].

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, trace};

use crate::error::TransportError;
use crate::transport::{Transport, TransportFuture};
use crate::types::{JobRequest, JobStatusResponse, SubmittedJob, USER_ID};

const DEFAULT_API_BASE: &str = "https://api.chromastudio.ai";
const DEFAULT_CONTENT_BASE: &str = "https://contents.maxstudio.ai";
const ACCEPT_ANY: &str = "application/json, text/plain, */*";

/// Characters left unescaped in a URL component (`A-Z a-z 0-9 - _ . ! ~ * ' ( )`).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Base URLs of the remote services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Job API base (upload slots, submission, status).
    pub api_base: String,
    /// Public read location of uploaded files.
    pub content_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            content_base: DEFAULT_CONTENT_BASE.into(),
        }
    }
}

impl Endpoints {
    fn api(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}

/// Escapes a single URL component.
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Production [`Transport`] over HTTP.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpTransport {
    /// Creates a transport for the given endpoints.
    pub fn new(endpoints: Endpoints) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Sends a request and rejects non-2xx responses.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, TransportError> {
        let resp = request.send().await?;
        let status = resp.status();
        trace!(status = status.as_u16(), url = %resp.url(), "response received");

        if !status.is_success() {
            return Err(TransportError::RequestFailed {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(resp)
    }
}

impl Transport for HttpTransport {
    fn request_upload_slot(&self, file_name: &str) -> TransportFuture<'_, String> {
        let url = format!(
            "{}?fileName={}",
            self.endpoints.api("/get-emd-upload-url"),
            encode_component(file_name)
        );
        Box::pin(async move {
            let resp = self.send(self.http.get(&url)).await?;
            let write_url = resp.text().await?.trim().to_string();
            if write_url.is_empty() {
                return Err(TransportError::MalformedResponse(
                    "empty upload URL".into(),
                ));
            }
            debug!("upload slot granted");
            Ok(write_url)
        })
    }

    fn put_bytes(
        &self,
        write_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> TransportFuture<'_, ()> {
        let request = self
            .http
            .put(write_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        Box::pin(async move {
            self.send(request).await?;
            Ok(())
        })
    }

    fn submit_job(&self, request: &JobRequest) -> TransportFuture<'_, SubmittedJob> {
        let request = self
            .http
            .post(self.endpoints.api("/image-gen"))
            .header(ACCEPT, ACCEPT_ANY)
            .json(request);
        Box::pin(async move {
            let resp = self.send(request).await?;
            let body = resp.bytes().await?;
            SubmittedJob::from_body(&body)
        })
    }

    fn fetch_job_status(&self, job_id: &str) -> TransportFuture<'_, JobStatusResponse> {
        let url = self.endpoints.api(&format!(
            "/image-gen/{}/{}/status",
            encode_component(USER_ID),
            encode_component(job_id)
        ));
        Box::pin(async move {
            let resp = self
                .send(self.http.get(&url).header(ACCEPT, ACCEPT_ANY))
                .await?;
            let body = resp.bytes().await?;
            Ok(serde_json::from_slice::<JobStatusResponse>(&body)?)
        })
    }

    fn fetch_bytes(&self, url: &str) -> TransportFuture<'_, Vec<u8>> {
        let request = self.http.get(url);
        Box::pin(async move {
            let resp = self.send(request).await?;
            Ok(resp.bytes().await?.to_vec())
        })
    }
}
