use anyhow::{Result, bail};
use std::time::Duration;

use crate::http::REQUEST_TIMEOUT;

/// Default base URL of the call API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Settings needed to talk to the call API.
#[derive(Clone, PartialEq)]
pub struct Config {
    /// Base URL with any trailing `/` removed.
    pub base_url: String,
    /// Shared secret sent as `api_key` in every request.
    pub api_key: String,
    /// Upper bound on a single request to the API.
    pub request_timeout: Duration,
}

impl Config {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if base_url.is_empty() {
            bail!("Base URL must not be empty");
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!(
                "Invalid base URL '{}'. Expected it to start with http:// or https://",
                base_url
            );
        }
        if api_key.trim().is_empty() {
            bail!("API key must not be empty. Pass --api-key or set CALLCTL_API_KEY.");
        }

        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            request_timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Joins the base URL with one of the fixed API paths.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

// The api key is masked so configs can be logged.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key", &mask_secret(&self.api_key))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}*********{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slashes() {
        let config = Config::new("https://calls.example.com///", "key").unwrap();
        assert_eq!(config.base_url, "https://calls.example.com");

        let config = Config::new("http://localhost:8000/v1/", "key").unwrap();
        assert_eq!(config.base_url, "http://localhost:8000/v1");
    }

    #[test]
    fn test_endpoint_joins_path() {
        let config = Config::new("http://localhost:8000/", "key").unwrap();
        assert_eq!(
            config.endpoint("/api/make_call"),
            "http://localhost:8000/api/make_call"
        );
        assert_eq!(
            config.endpoint("api/call_status"),
            "http://localhost:8000/api/call_status"
        );
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(Config::new("", "key").is_err());
        assert!(Config::new("/", "key").is_err());
        assert!(Config::new("ftp://example.com", "key").is_err());
        assert!(Config::new("http://example.com", "").is_err());
        assert!(Config::new("http://example.com", "   ").is_err());
    }

    #[test]
    fn test_request_timeout_default_and_override() {
        let config = Config::new(DEFAULT_BASE_URL, "key").unwrap();
        assert_eq!(config.request_timeout, REQUEST_TIMEOUT);

        let config = config.with_request_timeout(Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_debug_masks_api_key() {
        let config = Config::new("http://localhost", "sk_live_1234567890").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk_live_1234567890"));
        assert!(debug.contains("sk_l*********90"));

        let config = Config::new("http://localhost", "short").unwrap();
        assert!(format!("{:?}", config).contains("\"*****\""));
    }
}
