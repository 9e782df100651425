//! Taskboard Auth client for Rust
//!
//! This crate provides authentication for the Taskboard client: the auth
//! service (login, registration, current user) and the [`SessionStore`]
//! that tracks who is logged in for the lifetime of the application.

mod session;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use taskboard_rust_api::{ApiClient, ApiError};
use thiserror::Error;

pub use session::{AuthStatus, Session, SessionStore};

/// Error type
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Registration(String),
}

impl AuthError {
    /// The server supplied failure detail, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            AuthError::Api(err) => err.detail(),
            AuthError::Registration(message) => Some(message),
            AuthError::InvalidCredentials => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// User information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Full name when set, email otherwise
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.email,
        }
    }
}

/// Login credentials, sent form encoded
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// Registration payload
#[derive(Debug, Clone, Serialize)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Token issued by `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Auth client
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange credentials for a bearer token and persist it
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        let response = self
            .api
            .post("/auth/login")
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .execute::<AuthResponse>()
            .await?;

        if !response.access_token.is_empty() {
            self.api.set_token(&response.access_token)?;
            debug!("Stored {} token", response.token_type);
        }

        Ok(response)
    }

    /// Create an account; does not log in
    pub async fn register(&self, data: &RegisterData) -> Result<User> {
        let user = self
            .api
            .post("/auth/register")
            .json(data)?
            .execute::<User>()
            .await?;

        info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Fetch the user the stored token belongs to
    pub async fn get_current_user(&self) -> Result<User> {
        Ok(self.api.get("/users/me").execute::<User>().await?)
    }

    /// Forget the stored token. Storage failures are logged, not returned.
    pub fn logout(&self) {
        if let Err(e) = self.api.clear_token() {
            warn!("Failed to remove stored token: {}", e);
        }
    }

    /// Whether a token is stored; says nothing about whether the server still accepts it
    pub fn is_authenticated(&self) -> bool {
        self.api.token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_defaults() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "email": "test@example.com"
        }))
        .unwrap();

        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert_eq!(user.display_name(), "test@example.com");
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        let user = User {
            id: 1,
            email: "test@example.com".to_string(),
            full_name: Some("Test User".to_string()),
            is_active: true,
            is_superuser: false,
        };
        assert_eq!(user.display_name(), "Test User");
    }

    #[test]
    fn test_registration_error_exposes_message() {
        let err = AuthError::Registration("Email already registered".to_string());
        assert_eq!(err.detail(), Some("Email already registered"));
        assert_eq!(err.to_string(), "Email already registered");
    }
}
