use crate::endpoints::users::User;
use crate::error::StorageError;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Key-value persistence shared by the session and the UI preferences.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Authenticated,
}

/// Access and refresh token, always replaced together.
#[derive(Debug, Clone)]
pub struct Credentials {
    access_token: SecretString,
    refresh_token: SecretString,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: SecretString::from(refresh_token.into()),
        }
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }
}

#[derive(Default)]
struct SessionState {
    credentials: Option<Credentials>,
    identity: Option<User>,
}

/// Source of truth for the current credentials and signed-in user.
pub struct SessionStore {
    state: Mutex<SessionState>,
    storage: Arc<dyn Storage>,
    status: watch::Sender<SessionStatus>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let (status, _) = watch::channel(SessionStatus::Anonymous);
        Self {
            state: Mutex::new(SessionState::default()),
            storage,
            status,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Load the persisted token pair. An incomplete pair is discarded.
    pub fn init(&self) -> Result<SessionStatus, StorageError> {
        let access_token = self.storage.get(ACCESS_TOKEN_KEY)?;
        let refresh_token = self.storage.get(REFRESH_TOKEN_KEY)?;

        let mut state = self.lock();
        match (access_token, refresh_token) {
            (Some(access_token), Some(refresh_token)) => {
                state.credentials = Some(Credentials::new(access_token, refresh_token));
                tracing::debug!("Restored persisted credentials");
            }
            (None, None) => {
                state.credentials = None;
            }
            _ => {
                tracing::warn!("Discarding incomplete persisted credentials");
                state.credentials = None;
                self.storage.remove(ACCESS_TOKEN_KEY)?;
                self.storage.remove(REFRESH_TOKEN_KEY)?;
            }
        }
        state.identity = None;

        let status = Self::status_of(&state);
        self.publish(status);
        Ok(status)
    }

    pub fn set_credentials(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        let credentials = Credentials::new(access_token, refresh_token);

        let mut state = self.lock();
        if let Err(e) = self.persist(&credentials) {
            tracing::warn!("Failed to persist credentials: {}", e);
        }
        state.credentials = Some(credentials);
        // Publish before releasing the lock.
        self.publish(SessionStatus::Authenticated);
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.lock().credentials.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock()
            .credentials
            .as_ref()
            .map(|c| c.access_token().to_string())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.lock()
            .credentials
            .as_ref()
            .map(|c| c.refresh_token().to_string())
    }

    /// True when an access token is held. Validity is only learned on the next call.
    pub fn is_authenticated(&self) -> bool {
        self.lock().credentials.is_some()
    }

    pub fn status(&self) -> SessionStatus {
        Self::status_of(&self.lock())
    }

    /// Watch session transitions; `Anonymous` after `Authenticated` means the user must sign in again.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    pub fn identity(&self) -> Option<User> {
        self.lock().identity.clone()
    }

    pub fn set_identity(&self, user: User) {
        self.lock().identity = Some(user);
    }

    /// Drop tokens and identity, in memory and in storage. Never fails.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.credentials = None;
        state.identity = None;

        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("Failed to remove '{}' from storage: {}", key, e);
            }
        }
        self.publish(SessionStatus::Anonymous);
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        Arc::clone(&self.storage)
    }

    fn persist(&self, credentials: &Credentials) -> Result<(), StorageError> {
        self.storage
            .set(ACCESS_TOKEN_KEY, credentials.access_token())?;
        self.storage
            .set(REFRESH_TOKEN_KEY, credentials.refresh_token())
    }

    fn publish(&self, status: SessionStatus) {
        self.status.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn status_of(state: &SessionState) -> SessionStatus {
        if state.credentials.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        }
    }
}
