//! Wire types for the image-effect job API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TransportError;

/// Account identifier every job is submitted under.
pub const USER_ID: &str = "DObRu1vyStbUynoQmTcHBlhs55z2";

/// Effect applied by the generation job.
pub const EFFECT_ID: &str = "mugshot";

/// Model and tool type sent with every job.
pub const MODEL: &str = "image-effects";

/// JSON body of `POST /image-gen`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub model: String,
    pub tool_type: String,
    pub effect_id: String,
    pub image_url: String,
    pub user_id: String,
    pub remove_watermark: bool,
    pub is_private: bool,
}

impl JobRequest {
    /// Builds the fixed mugshot request for an uploaded image.
    pub fn for_image(image_url: &str) -> Self {
        Self {
            model: MODEL.into(),
            tool_type: MODEL.into(),
            effect_id: EFFECT_ID.into(),
            image_url: image_url.into(),
            user_id: USER_ID.into(),
            remove_watermark: true,
            is_private: true,
        }
    }
}

/// Parsed response of a job submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedJob {
    pub job_id: String,
    /// Remaining response fields, kept as-is.
    pub extra: Map<String, Value>,
}

impl SubmittedJob {
    /// Parses a submission response body.
    ///
    /// `jobId` may be a string or a number; anything else is malformed.
    pub fn from_body(body: &[u8]) -> Result<Self, TransportError> {
        let value: Value = serde_json::from_slice(body)?;
        let Value::Object(mut fields) = value else {
            return Err(TransportError::MalformedResponse(
                "submission response is not a JSON object".into(),
            ));
        };

        let job_id = match fields.remove("jobId") {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(TransportError::MalformedResponse(
                    "submission response has no jobId".into(),
                ));
            }
        };

        Ok(Self {
            job_id,
            extra: fields,
        })
    }
}

/// Normalized job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Submitted,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Maps a server status string. Unknown values count as still processing.
    pub fn from_wire(status: &str) -> Self {
        match status {
            "completed" => JobStatus::Completed,
            "failed" | "error" => JobStatus::Failed,
            "submitted" | "queued" | "pending" => JobStatus::Submitted,
            _ => JobStatus::Processing,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Response of `GET /image-gen/{userId}/{jobId}/status`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobStatusResponse {
    #[serde(default)]
    pub status: String,
    /// One result object or an ordered list of them. Kept untyped so a
    /// malformed trailing item cannot hide the first one.
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl JobStatusResponse {
    pub fn state(&self) -> JobStatus {
        JobStatus::from_wire(&self.status)
    }

    /// Image location of the first result item.
    ///
    /// Reads `image`, then `mediaUrl`. Non-string and empty values are
    /// ignored.
    pub fn artifact_location(&self) -> Option<&str> {
        let first = match self.result.as_ref()? {
            Value::Array(items) => items.first()?,
            item => item,
        };

        ["image", "mediaUrl"]
            .into_iter()
            .find_map(|key| first.get(key)?.as_str().filter(|s| !s.is_empty()))
    }

    /// Server-supplied error text, if any.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_request_wire_names() {
        let req = JobRequest::for_image("https://cdn/x.png");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "image-effects");
        assert_eq!(json["toolType"], "image-effects");
        assert_eq!(json["effectId"], "mugshot");
        assert_eq!(json["imageUrl"], "https://cdn/x.png");
        assert_eq!(json["userId"], USER_ID);
        assert_eq!(json["removeWatermark"], true);
        assert_eq!(json["isPrivate"], true);
    }

    #[test]
    fn submitted_job_string_id() {
        let job = SubmittedJob::from_body(br#"{"jobId":"J1","queue":3}"#).unwrap();
        assert_eq!(job.job_id, "J1");
        assert_eq!(job.extra["queue"], 3);
        assert!(!job.extra.contains_key("jobId"));
    }

    #[test]
    fn submitted_job_numeric_id() {
        let job = SubmittedJob::from_body(br#"{"jobId":1234}"#).unwrap();
        assert_eq!(job.job_id, "1234");
    }

    #[test]
    fn submitted_job_missing_id() {
        let err = SubmittedJob::from_body(br#"{"ok":true}"#).unwrap_err();
        assert!(matches!(err, TransportError::MalformedResponse(_)));

        let err = SubmittedJob::from_body(br#"{"jobId":""}"#).unwrap_err();
        assert!(matches!(err, TransportError::MalformedResponse(_)));

        let err = SubmittedJob::from_body(b"[1,2]").unwrap_err();
        assert!(matches!(err, TransportError::MalformedResponse(_)));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(JobStatus::from_wire("completed"), JobStatus::Completed);
        assert_eq!(JobStatus::from_wire("failed"), JobStatus::Failed);
        assert_eq!(JobStatus::from_wire("error"), JobStatus::Failed);
        assert_eq!(JobStatus::from_wire("queued"), JobStatus::Submitted);
        assert_eq!(JobStatus::from_wire("processing"), JobStatus::Processing);
        assert_eq!(JobStatus::from_wire("warming-up"), JobStatus::Processing);
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Submitted.is_terminal());
    }

    fn completed(result: &str) -> JobStatusResponse {
        serde_json::from_str(&format!(r#"{{"status":"completed","result":{result}}}"#)).unwrap()
    }

    #[test]
    fn status_single_result() {
        let resp = completed(r#"{"image":"https://x/out.jpg"}"#);
        assert_eq!(resp.artifact_location(), Some("https://x/out.jpg"));
    }

    #[test]
    fn status_list_result_uses_first() {
        let resp = completed(r#"[{"mediaUrl":"https://x/a.jpg"},{"image":"https://x/b.jpg"}]"#);
        assert_eq!(resp.artifact_location(), Some("https://x/a.jpg"));
    }

    #[test]
    fn status_unexpected_result_shape() {
        assert_eq!(completed(r#""done""#).artifact_location(), None);
        assert_eq!(completed("null").artifact_location(), None);
        assert_eq!(completed("[]").artifact_location(), None);
    }

    #[test]
    fn location_prefers_primary_and_skips_empty() {
        let both = completed(r#"{"image":"https://x/primary.jpg","mediaUrl":"https://x/fallback.jpg"}"#);
        assert_eq!(both.artifact_location(), Some("https://x/primary.jpg"));

        let empty_primary = completed(r#"{"image":"","mediaUrl":"https://x/fallback.jpg"}"#);
        assert_eq!(empty_primary.artifact_location(), Some("https://x/fallback.jpg"));

        let non_string_primary = completed(r#"{"image":7,"mediaUrl":"https://x/fallback.jpg"}"#);
        assert_eq!(non_string_primary.artifact_location(), Some("https://x/fallback.jpg"));

        assert_eq!(completed("{}").artifact_location(), None);
    }

    #[test]
    fn error_message_variants() {
        let resp: JobStatusResponse =
            serde_json::from_str(r#"{"status":"failed","error":"x"}"#).unwrap();
        assert_eq!(resp.error_message().as_deref(), Some("x"));

        let resp: JobStatusResponse =
            serde_json::from_str(r#"{"status":"failed","error":{"code":7}}"#).unwrap();
        assert_eq!(resp.error_message().as_deref(), Some(r#"{"code":7}"#));

        let resp: JobStatusResponse =
            serde_json::from_str(r#"{"status":"failed","error":null}"#).unwrap();
        assert_eq!(resp.error_message(), None);
    }
}
