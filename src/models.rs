//! Request and response shapes of the knowledge-assistant HTTP API.
//!
//! Requests are only constructible through validating constructors, so an
//! empty URL list or a blank question can never reach the network. Responses
//! tolerate missing or `null` fields and fall back to empty values.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::input::{normalize_domain, parse_urls, TopK, ValidationError};

/// Body of `GET /health`. Shape is owned by the backend.
pub type HealthStatus = serde_json::Map<String, Value>;

/// Body of `GET /metrics`. Shape is owned by the backend.
pub type MetricsSnapshot = serde_json::Map<String, Value>;

/// Body of `POST /ingest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestRequest {
    urls: Vec<String>,
}

impl IngestRequest {
    /// Build from already-split URLs. Entries are trimmed and blanks dropped.
    pub fn new<I, S>(urls: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|u| u.as_ref().trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if urls.is_empty() {
            return Err(ValidationError::EmptyUrls);
        }
        Ok(Self { urls })
    }

    /// Build from free text, one URL per line.
    pub fn from_text(text: &str) -> Result<Self, ValidationError> {
        Self::new(parse_urls(text))
    }

    /// The trimmed, non-empty URLs that will be sent.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}

/// Result of `POST /ingest`: stored chunk identifiers and an optional message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct IngestResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Body exactly as the backend sent it, including fields not modeled here.
    #[serde(skip)]
    pub raw: Value,
}

/// Body of `POST /ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskRequest {
    question: String,
    top_k: TopK,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<String>,
}

impl AskRequest {
    /// The question is sent as typed but must contain a non-whitespace character.
    pub fn new(question: &str, top_k: TopK, domain: Option<&str>) -> Result<Self, ValidationError> {
        if question.trim().is_empty() {
            return Err(ValidationError::EmptyQuestion);
        }
        Ok(Self {
            question: question.to_string(),
            top_k,
            domain: normalize_domain(domain),
        })
    }

    /// Build from raw form fields, coercing `top_k` text.
    pub fn from_form(
        question: &str,
        top_k: &str,
        domain: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Self::new(question, TopK::parse_or_default(top_k), domain)
    }

    /// Question text as typed.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Coerced passage count.
    pub fn top_k(&self) -> TopK {
        self.top_k
    }

    /// Trimmed collection name, if any.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }
}

/// Result of `POST /ask`: synthesized answer and the sources it cites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AskResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<SourceRef>,
    /// Body exactly as the backend sent it, including fields not modeled here.
    #[serde(skip)]
    pub raw: Value,
}

/// A cited source. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
