//! Error handling for the Taskboard Rust client

use std::fmt;
use thiserror::Error;

use taskboard_rust_api::ApiError;
use taskboard_rust_auth::AuthError;

/// Unified error type for the Taskboard Rust client
#[derive(Error, Debug)]
pub enum Error {
    /// Failures talking to the REST API or the token storage
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Login and registration failures
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Form input that cannot be turned into a request
    #[error("{0}")]
    Form(String),
}

impl Error {
    /// Create a new form error
    pub fn form<T: fmt::Display>(msg: T) -> Self {
        Error::Form(msg.to_string())
    }

    /// Whether the server no longer accepts the stored token
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Error::Api(err) | Error::Auth(AuthError::Api(err)) => err.is_unauthorized(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
