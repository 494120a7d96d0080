//! CLI entry points, one per panel.
//!
//! Each `run_*` function drives a [`Session`] action and prints the panel's
//! result to stdout. Notices (validation, success, errors) go through the
//! session's notifier on stderr.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use crate::models::{AskResponse, IngestResponse};
use crate::session::{FailurePolicy, Session, StatusView, Submission, HEALTH_FAILURE_POLICY};

/// Output format for command results.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Placeholder shown until the first successful status response.
pub const LOADING: &str = "Loading…";

/// Exit status for a rejected input (nothing was sent).
const EXIT_REJECTED: u8 = 2;

fn exit_code<T>(outcome: &Submission<T>) -> ExitCode {
    match outcome {
        Submission::Completed(_) => ExitCode::SUCCESS,
        Submission::Rejected(_) => ExitCode::from(EXIT_REJECTED),
        Submission::Failed(_) | Submission::Busy => ExitCode::FAILURE,
    }
}

/// `ka health`: API base plus the pretty `/health` body.
pub async fn run_health(
    session: &Session<'_>,
    report_errors: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    let policy = if report_errors {
        FailurePolicy::Notify
    } else {
        HEALTH_FAILURE_POLICY
    };
    let outcome = session.refresh_health(policy).await;
    let view = session.health();

    match format {
        OutputFormat::Json => {
            let health = match &view {
                StatusView::Ready(map) => serde_json::Value::Object(map.clone()),
                StatusView::Loading => serde_json::Value::Null,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "api_base": session.client().base_url(),
                    "health": health,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("API Base: {}", session.client().base_url());
            println!("/health");
            println!("{}", render_status(&view)?);
        }
    }

    Ok(exit_code(&outcome))
}

/// `ka metrics`: the pretty `/metrics` body.
pub async fn run_metrics(session: &Session<'_>, format: OutputFormat) -> Result<ExitCode> {
    let outcome = session.refresh_metrics(FailurePolicy::Notify).await;
    if outcome.is_completed() {
        let view = session.metrics();
        match format {
            OutputFormat::Json => println!("{}", render_status(&view)?),
            OutputFormat::Text => {
                println!("/metrics");
                println!("{}", render_status(&view)?);
            }
        }
    }
    Ok(exit_code(&outcome))
}

fn render_status(view: &StatusView) -> Result<String> {
    Ok(match view {
        StatusView::Ready(map) => serde_json::to_string_pretty(map)?,
        StatusView::Loading => LOADING.to_string(),
    })
}

/// Collect ingest input: positional URLs first, then the file (`-` for stdin).
pub fn read_ingest_text(urls: &[String], file: Option<&Path>) -> Result<String> {
    let mut text = urls.join("\n");
    if let Some(path) = file {
        let content = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read URLs from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read URL file: {}", path.display()))?
        };
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&content);
    }
    Ok(text)
}

/// `ka ingest`: submit URLs and print how many chunk ids were stored.
///
/// JSON output is the backend body as received.
pub async fn run_ingest(
    session: &Session<'_>,
    urls_text: &str,
    format: OutputFormat,
) -> Result<ExitCode> {
    let outcome = session.submit_ingest(urls_text).await;
    if let Submission::Completed(resp) = &outcome {
        print_ingest(resp, format)?;
    }
    Ok(exit_code(&outcome))
}

fn print_ingest(resp: &IngestResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resp.raw)?),
        OutputFormat::Text => {
            if let Some(ref message) = resp.message {
                println!("{}", message);
            }
            println!("Stored chunk IDs: {}", resp.ids.len());
            for id in &resp.ids {
                println!("  {}", id);
            }
        }
    }
    Ok(())
}

/// `ka ask`: print the answer and its sources.
pub async fn run_ask(
    session: &Session<'_>,
    question: &str,
    top_k: &str,
    domain: Option<&str>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let outcome = session.submit_ask(question, top_k, domain).await;
    if let Submission::Completed(resp) = &outcome {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resp.raw)?),
            OutputFormat::Text => print!("{}", render_answer(resp)),
        }
    }
    Ok(exit_code(&outcome))
}

/// Text rendering of an answer. Sources without a URL show `Unknown URL`.
pub fn render_answer(resp: &AskResponse) -> String {
    if resp.answer.is_empty() {
        return "No answer.\n".to_string();
    }

    let mut out = String::new();
    out.push_str("--- Answer ---\n");
    out.push_str(&resp.answer);
    out.push('\n');

    if !resp.sources.is_empty() {
        out.push('\n');
        out.push_str("--- Sources ---\n");
        for (i, source) in resp.sources.iter().enumerate() {
            let url = source.url.as_deref().unwrap_or("Unknown URL");
            out.push_str(&format!("[{}] {}\n", i + 1, url));
            if let Some(snippet) = source.snippet.as_deref().filter(|s| !s.is_empty()) {
                out.push_str(&format!("    {}\n", snippet));
            }
        }
    }
    out
}
