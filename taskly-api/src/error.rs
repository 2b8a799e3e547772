use crate::transport::HttpResponse;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    #[error("Session expired, please sign in again")]
    SessionExpired,

    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ApiError {
    /// Build the error for a non-2xx response, preferring the server's own message.
    pub(crate) fn from_response(response: &HttpResponse) -> Self {
        let message = response
            .is_json()
            .then(|| serde_json::from_slice::<ErrorBody>(&response.body).ok())
            .flatten()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| format!("HTTP Error: {}", response.status.as_u16()));

        ApiError::Http {
            status: response.status,
            message,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }
}

/// Error envelope returned by the API: `{ errors?, message? }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        let errors = self.errors.and_then(|errors| match errors {
            Value::String(text) => Some(text),
            Value::Null => None,
            other => Some(other.to_string()),
        });

        errors
            .filter(|text| !text.is_empty())
            .or(self.message.filter(|text| !text.is_empty()))
    }
}

/// Transport-level failure (connection refused, timeout, unreadable body).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}

#[derive(Debug, Error)]
#[error("Storage error: {0}")]
pub struct StorageError(pub String);

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.to_string())
    }
}
