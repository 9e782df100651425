//! Taskboard API client for Rust
//!
//! This crate holds the plumbing shared by the Taskboard service crates:
//! a request builder, the error type, client options and the persistent
//! token storage the bearer credential lives in.
//!
//! # Features
//!
//! - Bearer token attached to every request once a token is stored
//! - FastAPI-style `detail` extraction from error bodies
//! - In-memory and file backed token storage

pub mod config;
pub mod error;
pub mod fetch;
pub mod storage;

use std::sync::Arc;

use log::warn;
use reqwest::Client;

pub use config::ClientOptions;
pub use error::ApiError;
pub use fetch::FetchBuilder;
pub use storage::{FileStorage, MemoryStorage, TokenStorage};

pub type Result<T> = std::result::Result<T, ApiError>;

/// Shared HTTP client for the Taskboard REST API
///
/// Cloning is cheap: the reqwest client and the token storage are shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http_client: Client,
    storage: Arc<dyn TokenStorage>,
    options: ClientOptions,
}

impl ApiClient {
    /// Create a new API client, building a reqwest client from `options`
    pub fn new(options: ClientOptions, storage: Arc<dyn TokenStorage>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self::with_http_client(options, storage, http_client))
    }

    /// Create a new API client around an existing reqwest client
    pub fn with_http_client(
        options: ClientOptions,
        storage: Arc<dyn TokenStorage>,
        http_client: Client,
    ) -> Self {
        Self {
            base_url: options.base_url.trim_end_matches('/').to_string(),
            http_client,
            storage,
            options,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Full URL for an API path such as `/tasks/`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The persisted bearer token, if any.
    ///
    /// A storage failure is treated as "no token".
    pub fn token(&self) -> Option<String> {
        match self.storage.get_item(&self.options.token_key) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Failed to read token from storage: {}", e);
                None
            }
        }
    }

    /// Persist the bearer token
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.storage.set_item(&self.options.token_key, token)
    }

    /// Remove the persisted bearer token
    pub fn clear_token(&self) -> Result<()> {
        self.storage.remove_item(&self.options.token_key)
    }

    /// Start a request, attaching the client header and the bearer token when present
    pub fn request(&self, method: reqwest::Method, path: &str) -> FetchBuilder<'_> {
        let url = self.url(path);
        let builder = FetchBuilder::new(&self.http_client, &url, method)
            .header("X-Client-Info", &self.options.client_info);

        match self.token() {
            Some(token) => builder.bearer_auth(&token),
            None => builder,
        }
    }

    pub fn get(&self, path: &str) -> FetchBuilder<'_> {
        self.request(reqwest::Method::GET, path)
    }

    pub fn post(&self, path: &str) -> FetchBuilder<'_> {
        self.request(reqwest::Method::POST, path)
    }

    pub fn patch(&self, path: &str) -> FetchBuilder<'_> {
        self.request(reqwest::Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> FetchBuilder<'_> {
        self.request(reqwest::Method::DELETE, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(uri: &str, storage: Arc<dyn TokenStorage>) -> ApiClient {
        ApiClient::new(ClientOptions::default().with_base_url(uri), storage).unwrap()
    }

    #[tokio::test]
    async fn test_bearer_token_attached_when_present() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let storage = Arc::new(MemoryStorage::with_item("token", "abc"));
        let api = client_for(&mock_server.uri(), storage);

        let me = api
            .get("/users/me")
            .execute::<serde_json::Value>()
            .await
            .unwrap();
        assert_eq!(me["id"], 1);
    }

    #[tokio::test]
    async fn test_no_authorization_header_without_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "Not authenticated"
            })))
            .mount(&mock_server)
            .await;

        let api = client_for(&mock_server.uri(), Arc::new(MemoryStorage::new()));
        let err = api
            .get("/projects/")
            .execute::<serde_json::Value>()
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.detail(), Some("Not authenticated"));
    }

    #[test]
    fn test_token_roundtrip_uses_configured_key() {
        let storage = Arc::new(MemoryStorage::new());
        let options = ClientOptions::default().with_token_key("auth_token");
        let api = ApiClient::new(options, storage.clone()).unwrap();

        assert_eq!(api.token(), None);
        api.set_token("xyz").unwrap();
        assert_eq!(
            storage.get_item("auth_token").unwrap(),
            Some("xyz".to_string())
        );
        assert_eq!(api.token(), Some("xyz".to_string()));

        api.clear_token().unwrap();
        assert_eq!(api.token(), None);
    }

    #[test]
    fn test_url_joins_base() {
        let api = ApiClient::new(
            ClientOptions::default().with_base_url("http://localhost:8000/api/"),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap();

        assert_eq!(api.url("/tasks/"), "http://localhost:8000/api/tasks/");
    }
}
