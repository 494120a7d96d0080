//! # Knowledge Assistant client
//!
//! A typed client and command-line front end for the Modular Knowledge
//! Assistant HTTP API. The backend owns retrieval, ranking, embedding, and
//! storage; this crate only builds requests, validates form input, and
//! surfaces responses or failures.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────┐   HTTP   ┌──────────┐
//! │   CLI    │──▶│ Session  │──▶│ ApiClient │────────▶│ Backend  │
//! │  (ka)    │   │ (panels) │   └───────────┘          │ /health  │
//! └──────────┘   └────┬─────┘                          │ /ingest  │
//!                     ▼                                │ /ask     │
//!                ┌──────────┐                          └──────────┘
//!                │ Notifier │
//!                └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ka health
//! ka ingest https://en.wikipedia.org/wiki/Transformer_(deep_learning_architecture)
//! ka ask "Briefly explain multi-head attention and cite sources." --top-k 4
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and base URL resolution |
//! | [`input`] | Form input parsing (`urls`, `top_k`, `domain`) |
//! | [`models`] | Request/response shapes |
//! | [`error`] | Failure classification and message policy |
//! | [`client`] | HTTP client facade |
//! | [`notify`] | User-facing notices |
//! | [`session`] | Panel state, busy flags, action lifecycle |
//! | [`commands`] | CLI entry points |

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod notify;
pub mod session;
