//! User-facing notifications.
//!
//! Every panel action ends in at most one notice: informational for rejected
//! input, success for a completed ingest, error for a failed request. Notices
//! are fire-and-forget: [`Notifier::notify`] never blocks on the reader and
//! never fails.
//!
//! Notices go to **stderr** so stdout stays parseable for scripts.

use parking_lot::Mutex;
use serde::Serialize;
use std::io::Write;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    fn label(self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        }
    }

    fn color(self) -> &'static str {
        match self {
            NoticeLevel::Info => "\x1b[36m",
            NoticeLevel::Success => "\x1b[32m",
            NoticeLevel::Error => "\x1b[31m",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Receives notices from the session layer.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Human-friendly notices on stderr: `error: index not found`.
pub struct StderrNotifier {
    color: bool,
}

impl StderrNotifier {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        let line = format_human(&notice, self.color);
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", line);
        let _ = stderr.flush();
    }
}

fn format_human(notice: &Notice, color: bool) -> String {
    if color {
        format!(
            "{}{}:\x1b[0m {}",
            notice.level.color(),
            notice.level.label(),
            notice.text
        )
    } else {
        format!("{}: {}", notice.level.label(), notice.text)
    }
}

/// Machine-readable notices: one JSON object per line on stderr.
pub struct JsonNotifier;

impl Notifier for JsonNotifier {
    fn notify(&self, notice: Notice) {
        let obj = serde_json::json!({
            "event": "notice",
            "level": notice.level,
            "text": notice.text,
            "at": chrono::Utc::now().to_rfc3339(),
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// Collects notices in memory, for embedding the session in another front end.
#[derive(Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Drain and return everything received so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Notice format for the CLI.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeMode {
    Human { color: bool },
    Json,
}

impl NoticeMode {
    /// Human notices, colored only when stderr is a TTY.
    pub fn default_for_tty() -> Self {
        NoticeMode::Human {
            color: atty::is(atty::Stream::Stderr),
        }
    }

    pub fn notifier(&self) -> Box<dyn Notifier> {
        match *self {
            NoticeMode::Human { color } => Box::new(StderrNotifier::new(color)),
            NoticeMode::Json => Box::new(JsonNotifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_plain() {
        assert_eq!(
            format_human(&Notice::error("index not found"), false),
            "error: index not found"
        );
        assert_eq!(
            format_human(&Notice::success("Ingestion complete."), false),
            "ok: Ingestion complete."
        );
    }

    #[test]
    fn format_colored_keeps_text() {
        let line = format_human(&Notice::info("Please enter a question."), true);
        assert!(line.starts_with("\x1b[36m"));
        assert!(line.ends_with("Please enter a question."));
    }

    #[test]
    fn memory_notifier_take_drains() {
        let n = MemoryNotifier::new();
        n.notify(Notice::info("a"));
        n.notify(Notice::error("b"));
        assert_eq!(n.notices().len(), 2);
        let taken = n.take();
        assert_eq!(taken[1], Notice::error("b"));
        assert!(n.notices().is_empty());
    }

    #[test]
    fn level_serializes_lowercase() {
        let v = serde_json::to_value(Notice::success("done")).unwrap();
        assert_eq!(v["level"], "success");
    }
}
