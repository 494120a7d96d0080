//! HTTP client for the knowledge-assistant API.
//!
//! [`ApiClient`] is the single network entry point: it owns one
//! `reqwest::Client` configured with the base URL and a client-wide timeout,
//! and is built once at startup and passed by reference to callers.
//!
//! # Endpoints
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | `GET`  | `/health` | [`ApiClient::health`] |
//! | `POST` | `/ingest` | [`ApiClient::ingest`] |
//! | `POST` | `/ask` | [`ApiClient::ask`] |
//! | `GET`  | `/metrics` | [`ApiClient::metrics`] |
//!
//! Each operation issues exactly one request. There is no retry, backoff, or
//! caching; any failure is returned as a [`FailureMessage`].

use anyhow::Result;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::config::ApiConfig;
use crate::error::{ApiError, FailureMessage};
use crate::models::{
    AskRequest, AskResponse, HealthStatus, IngestRequest, IngestResponse, MetricsSnapshot,
};

/// Handle to one knowledge-assistant backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the underlying
    /// HTTP client cannot be constructed (e.g. TLS backend init failure).
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Url::parse(&config.base_url)?;
        let timeout = config.timeout();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ka/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timeout applied to every request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET /health`: opaque status object.
    pub async fn health(&self) -> Result<HealthStatus, FailureMessage> {
        self.send::<(), _>(Method::GET, "/health", None)
            .await
            .map_err(FailureMessage::from)
    }

    /// `POST /ingest`: returns the identifiers the backend stored.
    pub async fn ingest(&self, request: &IngestRequest) -> Result<IngestResponse, FailureMessage> {
        let raw = self.send_value(Method::POST, "/ingest", Some(request)).await?;
        let mut resp: IngestResponse = decode("/ingest", &raw)?;
        resp.raw = raw;
        Ok(resp)
    }

    /// `POST /ask`: answer plus cited sources.
    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, FailureMessage> {
        let raw = self.send_value(Method::POST, "/ask", Some(request)).await?;
        let mut resp: AskResponse = decode("/ask", &raw)?;
        resp.raw = raw;
        Ok(resp)
    }

    /// `GET /metrics`: opaque counters snapshot.
    pub async fn metrics(&self) -> Result<MetricsSnapshot, FailureMessage> {
        self.send::<(), _>(Method::GET, "/metrics", None)
            .await
            .map_err(FailureMessage::from)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let raw = self.send_value(method, path, body).await?;
        decode(path, &raw)
    }

    async fn send_value<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let timeout_secs = self.timeout.as_secs();
        let started = Instant::now();

        let mut request = self.http.request(method.clone(), self.endpoint(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let err = ApiError::from_reqwest(e, timeout_secs);
            tracing::warn!(%method, path, error = %err, "request failed");
            err
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(e, timeout_secs))?;

        tracing::debug!(
            %method,
            path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        if !status.is_success() {
            let err = ApiError::backend(status, &text);
            tracing::warn!(%method, path, status = status.as_u16(), error = %err, "backend error");
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|e| invalid_response(path, e))
    }
}

fn decode<T: DeserializeOwned>(path: &str, raw: &Value) -> Result<T, ApiError> {
    T::deserialize(raw).map_err(|e| invalid_response(path, e))
}

fn invalid_response(path: &str, err: serde_json::Error) -> ApiError {
    ApiError::Decode(format!("Invalid response from {}: {}", path, err))
}
