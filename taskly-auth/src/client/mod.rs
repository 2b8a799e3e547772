mod auth_service;
mod config;
mod file_storage;

pub use auth_service::AuthService;
pub use config::Settings;
pub use file_storage::FileStorage;

use crate::error::AuthError;
use std::sync::Arc;
use taskly_api::{Client, SessionStore};

/// Build the client stack described by `settings` and load any stored session.
pub fn connect(settings: &Settings) -> Result<AuthService, AuthError> {
    settings.validate().map_err(AuthError::Configuration)?;

    let storage = match &settings.storage_dir {
        Some(dir) => FileStorage::in_dir(dir)?,
        None => FileStorage::new()?,
    };
    tracing::debug!(path = %storage.path().display(), "Opened session store");

    let session = Arc::new(SessionStore::new(Arc::new(storage)));
    let status = session.init()?;
    tracing::info!(?status, "Session loaded");

    let client = Client::with_timeout(
        &settings.api_base_url,
        session,
        settings.request_timeout(),
    )?;

    Ok(AuthService::new(Arc::new(client)))
}
