pub mod endpoints;
mod error;
mod gateway;
mod macros;
pub mod repositories;
mod request;
pub mod session;
pub mod testing;
pub mod transport;

pub use crate::error::{ApiError, ErrorBody, StorageError, TransportError};
pub use crate::gateway::{Gateway, Payload, classify};
pub use crate::request::{PendingRequest, Request as ApiRequest, RequestData, encode_query};
pub use crate::session::{Credentials, MemoryStorage, SessionStatus, SessionStore, Storage};
pub use crate::transport::{FormPayload, ReqwestTransport, Transport};

use repositories::*;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Client {
    gateway: Gateway,
}

impl Client {
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, session, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        session: Arc<SessionStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(timeout)?;
        Ok(Self::with_transport(base_url, session, Arc::new(transport)))
    }

    pub fn with_transport(
        base_url: &str,
        session: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            gateway: Gateway::new(base_url, session, transport),
        }
    }

    pub async fn send<R>(&self, request: R) -> Result<R::Response, ApiError>
    where
        R: ApiRequest,
    {
        let pending = PendingRequest::from_request(&request)?;
        self.execute(&pending).await
    }

    /// Run an ad-hoc request; a 2xx without JSON decodes as `T::default()`.
    pub async fn execute<T>(&self, request: &PendingRequest) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        match self.gateway.execute(request).await? {
            Payload::Json(value) => Ok(serde_json::from_value(value)?),
            Payload::Empty => Ok(T::default()),
        }
    }

    pub async fn refresh_session(&self) -> Result<(), ApiError> {
        self.gateway.refresh_session().await
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.gateway.session()
    }

    pub fn base_url(&self) -> &str {
        self.gateway.base_url()
    }

    /// Resolve an avatar path from the API against the base URL.
    pub fn avatar_url(&self, avatar: Option<&str>) -> Option<String> {
        let avatar = avatar.filter(|path| !path.is_empty())?;
        if avatar.starts_with("http://") || avatar.starts_with("https://") {
            return Some(avatar.to_string());
        }
        Some(format!("{}{}", self.base_url().trim_end_matches('/'), avatar))
    }
}

pub struct Request;

impl Request {
    pub fn auth() -> AuthRepository {
        AuthRepository::new()
    }

    pub fn tasks() -> TaskRepository {
        TaskRepository::new()
    }

    pub fn users() -> UserRepository {
        UserRepository::new()
    }
}
