//! # Knowledge Assistant CLI (`ka`)
//!
//! Front end for the knowledge-assistant HTTP API. One subcommand per panel.
//!
//! ## Usage
//!
//! ```bash
//! ka --config ./config/ka.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ka health` | Show the API base and the backend `/health` report |
//! | `ka ingest <url>...` | Submit URLs for extraction and indexing |
//! | `ka ask "<question>"` | Ask a question and print the answer with sources |
//! | `ka metrics` | Show the backend `/metrics` snapshot |
//!
//! ## Examples
//!
//! ```bash
//! # Point at a non-default backend
//! KA_API_BASE_URL=http://kb.internal:8000 ka health
//!
//! # Ingest a list of URLs, one per line
//! ka ingest --file urls.txt
//!
//! # Restrict retrieval to one collection
//! ka ask "What is positional encoding?" --domain en.wikipedia.org --top-k 6
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use knowledge_assistant::client::ApiClient;
use knowledge_assistant::commands::{self, OutputFormat};
use knowledge_assistant::config;
use knowledge_assistant::notify::NoticeMode;
use knowledge_assistant::session::Session;

/// Knowledge Assistant CLI: ingest sources and ask questions against a
/// knowledge-assistant backend.
#[derive(Parser)]
#[command(
    name = "ka",
    about = "Knowledge Assistant: ingest URLs and ask questions against a knowledge-assistant API",
    version,
    long_about = "Client for the Modular Knowledge Assistant HTTP API. The backend performs \
    extraction, indexing, retrieval, and answer synthesis; this tool submits requests and \
    prints the results."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/ka.toml`. A missing file is not an error;
    /// built-in defaults are used instead.
    #[arg(long, global = true, default_value = "./config/ka.toml")]
    config: PathBuf,

    /// API base URL. Overrides `KA_API_BASE_URL` and `[api].base_url`.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Print results as JSON and notices as JSON lines on stderr.
    #[arg(long, global = true)]
    json: bool,

    /// Log level for diagnostics on stderr (`RUST_LOG` takes precedence).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Show the API base URL and the backend health report.
    ///
    /// Health is a passive display: when the backend is unreachable the
    /// report shows `Loading…` and no error is printed, unless
    /// `--report-errors` is given. The exit status is non-zero either way.
    Health {
        /// Print the failure reason when the health check fails.
        #[arg(long)]
        report_errors: bool,
    },

    /// Submit URLs (HTML or PDF) for ingestion.
    ///
    /// URLs are taken one per line from the arguments and/or `--file`.
    /// Lines are trimmed and blank lines ignored.
    Ingest {
        /// URLs to ingest.
        urls: Vec<String>,

        /// Read additional URLs from a file, one per line (`-` for stdin).
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Ask a question answered from ingested sources.
    Ask {
        /// The question.
        question: String,

        /// Number of supporting passages to retrieve. Values that are not a
        /// positive integer fall back to 4.
        #[arg(long, allow_hyphen_values = true)]
        top_k: Option<String>,

        /// Restrict retrieval to one collection (e.g. `en.wikipedia.org`).
        #[arg(long)]
        domain: Option<String>,
    },

    /// Show the backend metrics snapshot.
    Metrics,
}

/// Initialize logging with the specified level.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("knowledge_assistant={level},ka={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let mut cfg = config::load_config(&cli.config)?;
    if let Some(ref url) = cli.base_url {
        cfg = cfg.with_base_url(url)?;
    }

    let (format, notice_mode) = if cli.json {
        (OutputFormat::Json, NoticeMode::Json)
    } else {
        (OutputFormat::Text, NoticeMode::default_for_tty())
    };

    let client = ApiClient::new(&cfg.api)?;
    let notifier = notice_mode.notifier();
    let session = Session::new(&client, &*notifier);

    let code = match cli.command {
        Commands::Health { report_errors } => {
            commands::run_health(&session, report_errors, format).await?
        }
        Commands::Ingest { urls, file } => {
            let text = commands::read_ingest_text(&urls, file.as_deref())?;
            commands::run_ingest(&session, &text, format).await?
        }
        Commands::Ask {
            question,
            top_k,
            domain,
        } => {
            let top_k = top_k.unwrap_or_else(|| cfg.ask.top_k.to_string());
            let domain = domain.or_else(|| cfg.ask.domain.clone());
            commands::run_ask(&session, &question, &top_k, domain.as_deref(), format).await?
        }
        Commands::Metrics => commands::run_metrics(&session, format).await?,
    };

    Ok(code)
}
