use crate::error::AuthError;
use secrecy::SecretString;
use std::sync::Arc;
use taskly_api::endpoints::users::User;
use taskly_api::{Client, Request, SessionStore};

/// Sign-in flows on top of the API client and its session.
pub struct AuthService {
    client: Arc<Client>,
}

impl AuthService {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.client.session()
    }

    pub async fn register(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Result<User, AuthError> {
        let response = self
            .client
            .send(Request::auth().register(name, email, password))
            .await?;

        tracing::info!(user_id = %response.user.id, "Account registered");
        Ok(response.user)
    }

    /// Sign in, keeping the issued tokens and the user as the session identity.
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Result<User, AuthError> {
        let response = self
            .client
            .send(Request::auth().login(email, password))
            .await?;

        let (Some(token), Some(refresh_token)) = (response.token, response.refresh_token) else {
            return Err(AuthError::MissingToken);
        };

        let session = self.session();
        session.set_credentials(token, refresh_token);
        session.set_identity(response.user.clone());

        tracing::info!(user_id = %response.user.id, "Signed in");
        Ok(response.user)
    }

    pub async fn refresh(&self) -> Result<(), AuthError> {
        if self.session().refresh_token().is_none() {
            return Err(AuthError::MissingRefreshToken);
        }

        self.client.refresh_session().await?;
        Ok(())
    }

    /// Revoke the refresh token server-side when possible, then forget the session.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.session().refresh_token() {
            if let Err(e) = self.client.send(Request::auth().logout(refresh_token)).await {
                tracing::warn!("Server logout failed: {}", e);
            }
        }

        self.session().clear();
        tracing::info!("Signed out");
    }

    pub async fn current_user(&self) -> Result<User, AuthError> {
        let user = self.client.send(Request::users().current()).await?;
        self.session().set_identity(user.clone());
        Ok(user)
    }

    /// Check a stored session against the server.
    ///
    /// Returns the signed-in user, or `None` when there was no session or it
    /// could not be revived (in which case it is cleared).
    pub async fn restore(&self) -> Result<Option<User>, AuthError> {
        if !self.session().is_authenticated() {
            return Ok(None);
        }

        match self.current_user().await {
            Ok(user) => return Ok(Some(user)),
            Err(e) => tracing::warn!("Stored session rejected, attempting refresh: {}", e),
        }

        let revived = match self.refresh().await {
            Ok(()) => self.current_user().await,
            Err(e) => Err(e),
        };

        match revived {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("Could not restore session: {}", e);
                self.session().clear();
                Ok(None)
            }
        }
    }
}
