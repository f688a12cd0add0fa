//! Completion endpoint configuration.

use std::env;
use std::time::Duration;

use anyhow::{Result, anyhow};
use url::Url;

/// Environment variable holding the completion endpoint URL.
pub const ENDPOINT_ENV: &str = "AI_COMPLETIONS_ENDPOINT";
/// Environment variable holding the API key sent in the `api-key` header.
pub const API_KEY_ENV: &str = "AI_COMPLETIONS_API_KEY";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Hostnames allowed to use plain HTTP for local development.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Where and how to reach the completion collaborator.
#[derive(Clone)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CompletionConfig {
    /// Build a configuration, validating the endpoint.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        validate_endpoint(&endpoint)?;
        Ok(Self {
            endpoint,
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Read the endpoint and key from [`ENDPOINT_ENV`] and [`API_KEY_ENV`].
    pub fn from_environment() -> Result<Self> {
        let endpoint = read_required(ENDPOINT_ENV)?;
        let api_key = read_required(API_KEY_ENV)?;
        Self::new(endpoint, api_key)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn read_required(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow!("{name} must be set"))
}

/// Validate that an endpoint URL is acceptable.
///
/// Rules:
/// - it must parse and carry a host
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise the scheme must be HTTPS
fn validate_endpoint(endpoint: &str) -> Result<()> {
    let parsed = Url::parse(endpoint).map_err(|e| anyhow!("Invalid {ENDPOINT_ENV} URL '{}': {}", endpoint, e))?;

    let host_name = parsed.host_str().ok_or_else(|| anyhow!("{ENDPOINT_ENV} must include a host"))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        return Err(anyhow!(
            "{ENDPOINT_ENV} must use https for non-localhost hosts; got '{}://'",
            parsed.scheme()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_and_local_endpoints() {
        assert!(CompletionConfig::new("https://ai.example.com/v1/chat/completions", "k").is_ok());
        assert!(CompletionConfig::new("http://localhost:8080/complete", "k").is_ok());
        assert!(CompletionConfig::new("http://127.0.0.1:9000", "k").is_ok());
    }

    #[test]
    fn rejects_plain_http_and_garbage() {
        let err = CompletionConfig::new("http://ai.example.com", "k").unwrap_err();
        assert!(err.to_string().contains("https"), "unexpected error: {err}");
        assert!(CompletionConfig::new("not a url", "k").is_err());
    }

    #[test]
    fn reads_environment() {
        temp_env::with_vars(
            [(ENDPOINT_ENV, Some("https://ai.example.com/complete")), (API_KEY_ENV, Some(" secret "))],
            || {
                let config = CompletionConfig::from_environment().unwrap();
                assert_eq!(config.endpoint, "https://ai.example.com/complete");
                assert_eq!(config.api_key, "secret");
                assert_eq!(config.timeout, DEFAULT_TIMEOUT);
            },
        );
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        temp_env::with_vars(
            [(ENDPOINT_ENV, Some("https://ai.example.com/complete")), (API_KEY_ENV, None::<&str>)],
            || {
                let err = CompletionConfig::from_environment().unwrap_err();
                assert!(err.to_string().contains(API_KEY_ENV));
            },
        );
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config = CompletionConfig::new("https://ai.example.com", "super-secret").unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
