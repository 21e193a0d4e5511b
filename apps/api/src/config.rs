use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Only malformed numeric settings fail startup; a missing API key puts the
/// service in degraded mode instead.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` when `GEMINI_API_KEY` is unset. A blank value is kept as `Some("")`
    /// so `/health` can still report the key as configured.
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            gemini_api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string()),
            port: parse_env("PORT", DEFAULT_PORT)?,
            static_dir: std::env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// True when the key variable exists at all, blank or not.
    pub fn api_configured(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    /// The key to build a client with, if it is usable.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by handler tests; never touches the environment.
    pub fn for_tests(gemini_api_key: Option<&str>) -> Self {
        Config {
            gemini_api_key: gemini_api_key.map(String::from),
            gemini_api_base: "http://127.0.0.1:9".to_string(),
            port: 0,
            static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            rust_log: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_configured_but_unusable() {
        let config = Config::for_tests(Some("   "));
        assert!(config.api_configured());
        assert_eq!(config.usable_api_key(), None);
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let config = Config::for_tests(None);
        assert!(!config.api_configured());
        assert_eq!(config.usable_api_key(), None);
    }

    #[test]
    fn test_usable_key_is_trimmed() {
        let config = Config::for_tests(Some(" abc123 \n"));
        assert_eq!(config.usable_api_key(), Some("abc123"));
    }
}
