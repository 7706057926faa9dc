use crate::args::HttpMethod;
use crate::error::TaskError;

/// Body marker for HEAD requests and 204 responses.
pub const NO_BODY: &str = "[No body]";

/// How a response body is captured, chosen from method, status, and
/// `Content-Type` before anything is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyCapture {
    Skip,
    Json,
    Text,
    Binary(String),
}

impl BodyCapture {
    #[must_use]
    pub fn select(method: HttpMethod, status: u16, content_type: &str) -> Self {
        if matches!(method, HttpMethod::Head) || status == 204 {
            return BodyCapture::Skip;
        }
        if content_type.contains("application/json") {
            BodyCapture::Json
        } else if content_type.contains("text/") {
            BodyCapture::Text
        } else {
            BodyCapture::Binary(content_type.to_owned())
        }
    }
}

#[must_use]
pub fn binary_marker(content_type: &str) -> String {
    format!("[Binary data - {}]", content_type)
}

/// Re-serializes a JSON document with two-space indentation, keeping key order.
///
/// # Errors
///
/// Returns `TaskError::InvalidJson` when the bytes are not valid JSON.
pub fn pretty_json(bytes: &[u8]) -> Result<String, TaskError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|err| TaskError::InvalidJson {
            message: err.to_string(),
        })?;
    serde_json::to_string_pretty(&value).map_err(|err| TaskError::InvalidJson {
        message: err.to_string(),
    })
}
