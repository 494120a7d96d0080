//! Parsing of raw form input into request values.
//!
//! These functions are pure and are shared by the session layer and the CLI:
//!
//! - [`parse_urls`] turns free text (one URL per line) into the ingest list.
//! - [`TopK::parse_or_default`] coerces user text into a positive integer,
//!   falling back to [`DEFAULT_TOP_K`].
//! - [`normalize_domain`] trims the optional collection name and drops it
//!   when blank.

use serde::Serialize;
use std::fmt;
use std::num::NonZeroU32;
use thiserror::Error;

/// `top_k` used when the supplied value is not a positive integer.
pub const DEFAULT_TOP_K: u32 = 4;

/// Client-local input errors. The request is never sent when one occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter 1 or more URLs (one per line).")]
    EmptyUrls,
    #[error("Please enter a question.")]
    EmptyQuestion,
}

/// Split `text` on line breaks (`\n` or `\r\n`), trim each line, and drop blanks.
pub fn parse_urls(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim the domain; `None` if absent or whitespace-only.
pub fn normalize_domain(domain: Option<&str>) -> Option<String> {
    domain
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// Number of supporting passages to retrieve. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopK(NonZeroU32);

impl TopK {
    /// `None` for zero.
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    /// Parse a decimal positive integer; anything else yields [`DEFAULT_TOP_K`].
    ///
    /// Only plain digit strings count. Float spellings of integers such as
    /// `"7.0"` or `"1e1"` are not positive integers as typed and also fall
    /// back to the default.
    pub fn parse_or_default(text: &str) -> Self {
        text.trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .unwrap_or_default()
    }

    /// The value as a plain integer.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for TopK {
    fn default() -> Self {
        Self(NonZeroU32::MIN.saturating_add(DEFAULT_TOP_K - 1))
    }
}

impl fmt::Display for TopK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urls_trims_and_filters() {
        let urls = parse_urls("  http://a.com \n\nhttp://b.com");
        assert_eq!(urls, vec!["http://a.com", "http://b.com"]);
    }

    #[test]
    fn test_parse_urls_crlf() {
        let urls = parse_urls("http://a.com\r\nhttp://b.com\r\n");
        assert_eq!(urls, vec!["http://a.com", "http://b.com"]);
    }

    #[test]
    fn test_parse_urls_preserves_order_and_duplicates() {
        let urls = parse_urls("http://b.com\nhttp://a.com\nhttp://b.com");
        assert_eq!(urls, vec!["http://b.com", "http://a.com", "http://b.com"]);
    }

    #[test]
    fn test_parse_urls_whitespace_only() {
        assert!(parse_urls("   \n\t\n  \r\n").is_empty());
        assert!(parse_urls("").is_empty());
    }

    #[test]
    fn test_top_k_fallbacks() {
        for bad in ["0", "", "abc", "-3", "2.5", "  ", "7.0", "1e1"] {
            assert_eq!(
                TopK::parse_or_default(bad).get(),
                DEFAULT_TOP_K,
                "input {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_top_k_valid() {
        assert_eq!(TopK::parse_or_default("7").get(), 7);
        assert_eq!(TopK::parse_or_default(" 10 ").get(), 10);
    }

    #[test]
    fn test_top_k_default() {
        assert_eq!(TopK::default().get(), DEFAULT_TOP_K);
        assert!(TopK::new(0).is_none());
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain(Some("  ")), None);
        assert_eq!(normalize_domain(None), None);
        assert_eq!(
            normalize_domain(Some(" en.wikipedia.org ")),
            Some("en.wikipedia.org".to_string())
        );
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::EmptyUrls.to_string(),
            "Please enter 1 or more URLs (one per line)."
        );
        assert_eq!(
            ValidationError::EmptyQuestion.to_string(),
            "Please enter a question."
        );
    }
}
