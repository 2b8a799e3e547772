use taskly_api::{ApiError, StorageError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Token storage error: {0}")]
    TokenStorage(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("No refresh token stored, please sign in again")]
    MissingRefreshToken,

    #[error("Server response did not include tokens")]
    MissingToken,
}

impl AuthError {
    /// True when the caller has to sign in again.
    pub fn is_session_expired(&self) -> bool {
        match self {
            AuthError::Api(e) => e.is_session_expired(),
            AuthError::MissingRefreshToken => true,
            _ => false,
        }
    }
}

impl From<config::ConfigError> for AuthError {
    fn from(err: config::ConfigError) -> Self {
        AuthError::Configuration(err.to_string())
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::TokenStorage(err.0)
    }
}
