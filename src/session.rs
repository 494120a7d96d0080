//! Panel state and action lifecycle.
//!
//! A [`Session`] holds what a front end displays for each panel (health,
//! ingest, ask, metrics) and drives one request per user action:
//!
//! ```text
//! acquire busy flag ──▶ validate ──▶ reset panel ──▶ request ──▶ store result
//!        │                │                               │
//!        ▼                ▼                               ▼
//!      Busy          info notice                    error notice
//! ```
//!
//! Each action has its own busy flag, so a second submission of the same
//! action while one is in flight resolves to [`Submission::Busy`] without a
//! request, while different actions may run concurrently. The flag is held
//! by a guard and released on every exit path.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::ApiClient;
use crate::error::FailureMessage;
use crate::input::ValidationError;
use crate::models::{
    AskRequest, AskResponse, HealthStatus, IngestRequest, IngestResponse, MetricsSnapshot,
    SourceRef,
};
use crate::notify::{Notice, Notifier};

/// Whether a failure should reach the notifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailurePolicy {
    Notify,
    Silent,
}

/// Health is a passive display: failures are not reported.
pub const HEALTH_FAILURE_POLICY: FailurePolicy = FailurePolicy::Silent;

/// Success notice after an ingest.
pub const INGEST_COMPLETE: &str = "Ingestion complete.";

/// Outcome of one panel action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission<T> {
    Completed(T),
    /// The request was sent and failed; the panel keeps its reset state.
    Failed(FailureMessage),
    /// Input was invalid; nothing was sent.
    Rejected(ValidationError),
    /// The same action is already in flight; nothing was sent.
    Busy,
}

impl<T> Submission<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Submission::Completed(_))
    }
}

/// What the health (or metrics) panel shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StatusView {
    /// No successful response yet.
    #[default]
    Loading,
    Ready(serde_json::Map<String, serde_json::Value>),
}

/// What the ask panel shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerView {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

#[derive(Default)]
struct BusyFlag(AtomicBool);

impl BusyFlag {
    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.0))
    }

    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Panel state for one front end, bound to a client and a notifier.
pub struct Session<'a> {
    client: &'a ApiClient,
    notifier: &'a dyn Notifier,
    health: Mutex<StatusView>,
    health_busy: BusyFlag,
    metrics: Mutex<StatusView>,
    metrics_busy: BusyFlag,
    ingest_ids: Mutex<Vec<String>>,
    ingest_busy: BusyFlag,
    answer: Mutex<AnswerView>,
    ask_busy: BusyFlag,
}

impl<'a> Session<'a> {
    /// Start with every panel empty and health `Loading`.
    pub fn new(client: &'a ApiClient, notifier: &'a dyn Notifier) -> Self {
        Self {
            client,
            notifier,
            health: Mutex::new(StatusView::Loading),
            health_busy: BusyFlag::default(),
            metrics: Mutex::new(StatusView::Loading),
            metrics_busy: BusyFlag::default(),
            ingest_ids: Mutex::new(Vec::new()),
            ingest_busy: BusyFlag::default(),
            answer: Mutex::new(AnswerView::default()),
            ask_busy: BusyFlag::default(),
        }
    }

    /// The client this session sends through.
    pub fn client(&self) -> &ApiClient {
        self.client
    }

    // ============ Health ============

    /// Fetch `/health`. On failure the previous view is kept.
    pub async fn refresh_health(&self, policy: FailurePolicy) -> Submission<HealthStatus> {
        let Some(_guard) = self.health_busy.try_acquire() else {
            return Submission::Busy;
        };
        match self.client.health().await {
            Ok(status) => {
                *self.health.lock() = StatusView::Ready(status.clone());
                Submission::Completed(status)
            }
            Err(failure) => self.fail(failure, policy),
        }
    }

    pub fn health(&self) -> StatusView {
        self.health.lock().clone()
    }

    // ============ Metrics ============

    /// Fetch `/metrics`. On failure the previous view is kept.
    pub async fn refresh_metrics(&self, policy: FailurePolicy) -> Submission<MetricsSnapshot> {
        let Some(_guard) = self.metrics_busy.try_acquire() else {
            return Submission::Busy;
        };
        match self.client.metrics().await {
            Ok(snapshot) => {
                *self.metrics.lock() = StatusView::Ready(snapshot.clone());
                Submission::Completed(snapshot)
            }
            Err(failure) => self.fail(failure, policy),
        }
    }

    pub fn metrics(&self) -> StatusView {
        self.metrics.lock().clone()
    }

    // ============ Ingest ============

    /// Ingest URLs from free text, one per line.
    pub async fn submit_ingest(&self, urls_text: &str) -> Submission<IngestResponse> {
        let Some(_guard) = self.ingest_busy.try_acquire() else {
            return Submission::Busy;
        };
        let request = match IngestRequest::from_text(urls_text) {
            Ok(r) => r,
            Err(e) => return self.reject(e),
        };
        self.ingest_ids.lock().clear();

        tracing::info!(urls = request.urls().len(), "submitting ingest");
        match self.client.ingest(&request).await {
            Ok(resp) => {
                *self.ingest_ids.lock() = resp.ids.clone();
                self.notifier.notify(Notice::success(INGEST_COMPLETE));
                Submission::Completed(resp)
            }
            Err(failure) => self.fail(failure, FailurePolicy::Notify),
        }
    }

    /// Reset the stored ids. Refused while an ingest is in flight.
    pub fn clear_ingest(&self) -> bool {
        if self.ingest_busy.is_set() {
            return false;
        }
        self.ingest_ids.lock().clear();
        true
    }

    pub fn ingest_ids(&self) -> Vec<String> {
        self.ingest_ids.lock().clone()
    }

    pub fn is_ingesting(&self) -> bool {
        self.ingest_busy.is_set()
    }

    // ============ Ask ============

    /// Ask a question from raw form fields. `top_k` text is coerced.
    pub async fn submit_ask(
        &self,
        question: &str,
        top_k: &str,
        domain: Option<&str>,
    ) -> Submission<AskResponse> {
        let Some(_guard) = self.ask_busy.try_acquire() else {
            return Submission::Busy;
        };
        let request = match AskRequest::from_form(question, top_k, domain) {
            Ok(r) => r,
            Err(e) => return self.reject(e),
        };
        *self.answer.lock() = AnswerView::default();

        tracing::info!(
            top_k = request.top_k().get(),
            domain = request.domain().unwrap_or("*"),
            "submitting question"
        );
        match self.client.ask(&request).await {
            Ok(resp) => {
                *self.answer.lock() = AnswerView {
                    answer: resp.answer.clone(),
                    sources: resp.sources.clone(),
                };
                Submission::Completed(resp)
            }
            Err(failure) => self.fail(failure, FailurePolicy::Notify),
        }
    }

    pub fn answer(&self) -> AnswerView {
        self.answer.lock().clone()
    }

    pub fn is_asking(&self) -> bool {
        self.ask_busy.is_set()
    }

    fn reject<T>(&self, err: ValidationError) -> Submission<T> {
        self.notifier.notify(Notice::info(err.to_string()));
        Submission::Rejected(err)
    }

    fn fail<T>(&self, failure: FailureMessage, policy: FailurePolicy) -> Submission<T> {
        if policy == FailurePolicy::Notify {
            self.notifier.notify(Notice::error(failure.text()));
        }
        Submission::Failed(failure)
    }
}
