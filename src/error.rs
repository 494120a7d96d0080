//! Failure classification for API calls.
//!
//! [`ApiError`] is what the HTTP layer observes. It is collapsed into a
//! single human-readable [`FailureMessage`] at the client boundary using the
//! following preference order:
//!
//! 1. the `detail` field of the error response body, when present
//! 2. the transport-level message (`Request failed with status code 500`,
//!    connection errors, timeouts)
//! 3. [`UNEXPECTED_ERROR`]

use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Last-resort message when nothing better is available.
pub const UNEXPECTED_ERROR: &str = "Unexpected error";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, timeout).
    #[error("{message}")]
    Transport { message: String, timed_out: bool },

    /// The backend answered with a non-2xx status.
    #[error("Request failed with status code {}", .status.as_u16())]
    Backend {
        status: StatusCode,
        detail: Option<String>,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error("{0}")]
    Decode(String),
}

impl ApiError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            return ApiError::Transport {
                message: format!("request timed out after {}s", timeout_secs),
                timed_out: true,
            };
        }
        ApiError::Transport {
            message: error_chain(&err),
            timed_out: false,
        }
    }

    /// Build a backend error from a status and the raw response body.
    pub(crate) fn backend(status: StatusCode, body: &str) -> Self {
        ApiError::Backend {
            status,
            detail: extract_detail(body),
        }
    }
}

/// Join an error with its sources: `error sending request: connection refused`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Pull a human message out of an error body's `detail` field.
///
/// Accepts a plain string, or a list of validation entries carrying `msg`
/// (the shape FastAPI uses for 422 responses).
pub fn extract_detail(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    match json.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .filter(|m| !m.trim().is_empty())
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}

/// Which branch of the error taxonomy a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Timeout,
    Backend,
    Unexpected,
}

/// The one message a failed operation resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureMessage {
    kind: FailureKind,
    text: String,
}

impl FailureMessage {
    pub fn new(kind: FailureKind, text: impl Into<String>) -> Self {
        let text = text.into();
        let text = if text.trim().is_empty() {
            UNEXPECTED_ERROR.to_string()
        } else {
            text
        };
        Self { kind, text }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for FailureMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::error::Error for FailureMessage {}

impl From<ApiError> for FailureMessage {
    fn from(err: ApiError) -> Self {
        match &err {
            ApiError::Backend {
                detail: Some(detail),
                ..
            } => FailureMessage::new(FailureKind::Backend, detail.clone()),
            ApiError::Backend { detail: None, .. } => {
                FailureMessage::new(FailureKind::Backend, err.to_string())
            }
            ApiError::Transport { timed_out, .. } => {
                let kind = if *timed_out {
                    FailureKind::Timeout
                } else {
                    FailureKind::Transport
                };
                FailureMessage::new(kind, err.to_string())
            }
            ApiError::Decode(_) => FailureMessage::new(FailureKind::Unexpected, err.to_string()),
        }
    }
}
