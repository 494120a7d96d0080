//! TOML configuration for the `ka` client.
//!
//! Every section is optional; a missing file yields [`Config::default`].
//! The API base URL can be overridden by the `KA_API_BASE_URL` environment
//! variable, which in turn is overridden by `--base-url` on the command line.

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::input::DEFAULT_TOP_K;

/// Environment variable holding the API base URL.
pub const BASE_URL_ENV: &str = "KA_API_BASE_URL";

/// Base URL used when neither config, env, nor flag provide one.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ask: AskDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

/// Defaults for the `ask` command when flags are omitted.
#[derive(Debug, Deserialize, Clone)]
pub struct AskDefaults {
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default)]
    pub domain: Option<String>,
}

impl Default for AskDefaults {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            domain: None,
        }
    }
}

fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}

/// Load the config file at `path`, apply the environment override, and validate.
pub fn load_config(path: &Path) -> Result<Config> {
    let env_base_url = std::env::var(BASE_URL_ENV).ok();
    load_config_with_env(path, env_base_url.as_deref())
}

/// Like [`load_config`], with the environment value passed in explicitly.
pub fn load_config_with_env(path: &Path, env_base_url: Option<&str>) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str::<Config>(&content).with_context(|| "Failed to parse config file")?
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Config::default()
    };

    if let Some(url) = env_base_url.map(str::trim).filter(|u| !u.is_empty()) {
        config.api.base_url = url.to_string();
    }

    validate(&config)?;
    Ok(config)
}

impl Config {
    /// Replace the base URL (from `--base-url`) and re-validate.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.api.base_url = base_url.trim().to_string();
        validate(&self)?;
        Ok(self)
    }
}

fn validate(config: &Config) -> Result<()> {
    let url = Url::parse(&config.api.base_url)
        .with_context(|| format!("api.base_url is not a valid URL: '{}'", config.api.base_url))?;
    match url.scheme() {
        "http" | "https" => {}
        other => bail!("api.base_url must use http or https, got '{}'", other),
    }

    if config.api.timeout_secs == 0 {
        bail!("api.timeout_secs must be > 0");
    }

    if config.ask.top_k == 0 {
        bail!("ask.top_k must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(tmp: &TempDir, content: &str) -> std::path::PathBuf {
        let path = tmp.path().join("ka.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config_with_env(&tmp.path().join("nope.toml"), None).unwrap();
        assert_eq!(cfg.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.api.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.ask.top_k, 4);
        assert!(cfg.ask.domain.is_none());
    }

    #[test]
    fn test_file_values() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"
[api]
base_url = "http://kb.internal:9000"
timeout_secs = 5

[ask]
top_k = 6
domain = "en.wikipedia.org"
"#,
        );
        let cfg = load_config_with_env(&path, None).unwrap();
        assert_eq!(cfg.api.base_url, "http://kb.internal:9000");
        assert_eq!(cfg.api.timeout_secs, 5);
        assert_eq!(cfg.ask.top_k, 6);
        assert_eq!(cfg.ask.domain.as_deref(), Some("en.wikipedia.org"));
    }

    #[test]
    fn test_env_overrides_file() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[api]\nbase_url = \"http://file:1\"\n");
        let cfg = load_config_with_env(&path, Some(" http://env:2 ")).unwrap();
        assert_eq!(cfg.api.base_url, "http://env:2");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config_with_env(&tmp.path().join("x.toml"), Some("   ")).unwrap();
        assert_eq!(cfg.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_flag_overrides_everything() {
        let cfg = Config::default()
            .with_base_url("https://kb.example.com")
            .unwrap();
        assert_eq!(cfg.api.base_url, "https://kb.example.com");
    }

    #[test]
    fn test_rejects_bad_scheme() {
        let err = Config::default().with_base_url("ftp://x").unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_rejects_relative_url() {
        assert!(Config::default().with_base_url("localhost:8000/api").is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[api]\ntimeout_secs = 0\n");
        let err = load_config_with_env(&path, None).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[api\nbase_url=");
        let err = load_config_with_env(&path, None).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
