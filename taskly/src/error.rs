use taskly_api::{ApiError, StorageError};
use taskly_auth::AuthError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    InvalidAvatar(String),

    #[error("{0}")]
    Validation(String),
}

impl AppError {
    pub fn is_session_expired(&self) -> bool {
        match self {
            AppError::Api(e) => e.is_session_expired(),
            AppError::Auth(e) => e.is_session_expired(),
            _ => false,
        }
    }
}
