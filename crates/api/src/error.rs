//! Transport error types.

/// Errors produced by a [`Transport`](crate::Transport) call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// No HTTP response arrived (DNS, connect, TLS, reset, timeout).
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("request failed: {status} {status_text}")]
    RequestFailed { status: u16, status_text: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for TransportError {
    /// Status codes never reach here: `HttpTransport` checks them itself.
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() || e.is_builder() {
            TransportError::MalformedResponse(e.to_string())
        } else {
            TransportError::NetworkUnavailable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        TransportError::MalformedResponse(e.to_string())
    }
}
