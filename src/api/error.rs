use serde::Deserialize;
use thiserror::Error;

/// Error body returned by the Neptune loader endpoint, plus the HTTP status it
/// arrived with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error(
    "requestId: {}, code: {}, message: {}.",
    field(.request_id),
    field(.code),
    field(.detailed_message)
)]
pub struct ApiError {
    #[serde(skip)]
    status_code: Option<u16>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    detailed_message: Option<String>,
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

impl ApiError {
    pub fn new(
        status_code: u16,
        request_id: impl Into<String>,
        code: impl Into<String>,
        detailed_message: impl Into<String>,
    ) -> Self {
        Self {
            status_code: Some(status_code),
            request_id: Some(request_id.into()),
            code: Some(code.into()),
            detailed_message: Some(detailed_message.into()),
        }
    }

    pub(crate) fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.detailed_message.as_deref()
    }

    /// Whether the status suggests a later attempt may succeed (429 or 5xx).
    ///
    /// Nothing in this crate retries; this is a hint for caller-side policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self.status_code, Some(429) | Some(500..=599))
    }
}
