//! Configuration options for the Taskboard client

use std::env;
use std::time::Duration;

/// Default API root of a locally running server
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Storage key the bearer token is persisted under
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// Configuration options for the Taskboard client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The API root every request path is appended to
    pub base_url: String,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The storage key holding the bearer token
    pub token_key: String,

    /// Sent as `X-Client-Info` with every request
    pub client_info: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Some(Duration::from_secs(30)),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            client_info: format!("taskboard-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Build options from `TASKBOARD_API_URL`, `TASKBOARD_TIMEOUT_SECS` and
    /// `TASKBOARD_TOKEN_KEY`, falling back to the defaults for anything unset.
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(url) = env::var("TASKBOARD_API_URL") {
            options = options.with_base_url(&url);
        }

        if let Ok(secs) = env::var("TASKBOARD_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(0) => options.request_timeout = None,
                Ok(secs) => options.request_timeout = Some(Duration::from_secs(secs)),
                Err(_) => log::warn!("Ignoring invalid TASKBOARD_TIMEOUT_SECS value: {}", secs),
            }
        }

        if let Ok(key) = env::var("TASKBOARD_TOKEN_KEY") {
            options.token_key = key;
        }

        options
    }

    /// Set the API root
    pub fn with_base_url(mut self, value: &str) -> Self {
        self.base_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the storage key for the bearer token
    pub fn with_token_key(mut self, value: &str) -> Self {
        self.token_key = value.to_string();
        self
    }

    /// Set the `X-Client-Info` header value
    pub fn with_client_info(mut self, value: &str) -> Self {
        self.client_info = value.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_trims_trailing_slash() {
        let options = ClientOptions::default()
            .with_base_url("http://example.com/api/")
            .with_token_key("auth")
            .with_request_timeout(None);

        assert_eq!(options.base_url, "http://example.com/api");
        assert_eq!(options.token_key, "auth");
        assert!(options.request_timeout.is_none());
    }

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();

        assert_eq!(options.base_url, DEFAULT_BASE_URL);
        assert_eq!(options.token_key, "token");
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
        assert!(options.client_info.starts_with("taskboard-rust/"));
    }
}
