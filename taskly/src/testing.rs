use crate::app_core::AppCore;
use crate::state::AppState;
use std::sync::Arc;
use taskly_api::testing::MockTransport;
use taskly_api::{Client, SessionStore};
use taskly_auth::AuthService;

pub const TEST_BASE_URL: &str = "http://api.test";

/// App core wired to a scripted transport and in-memory storage
pub struct TestApp {
    pub core: AppCore,
    pub transport: Arc<MockTransport>,
}

impl TestApp {
    /// Create a signed-out test app
    pub fn new() -> Self {
        let transport = Arc::new(MockTransport::new());
        let session = Arc::new(SessionStore::in_memory());
        let client = Client::with_transport(TEST_BASE_URL, session, transport.clone());

        Self {
            core: AppCore::new(AuthService::new(Arc::new(client))),
            transport,
        }
    }

    /// Create a test app holding the given token pair
    pub fn signed_in(access_token: &str, refresh_token: &str) -> Self {
        let app = Self::new();
        app.session().set_credentials(access_token, refresh_token);
        app
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.core.session()
    }

    /// Get read-only access to current state
    pub fn state(&self) -> &AppState {
        self.core.state()
    }

    pub fn task_titles(&self) -> Vec<&str> {
        self.state().tasks.iter().map(|t| t.title.as_str()).collect()
    }

    /// Assert that the session was dropped
    pub fn assert_signed_out(&self) {
        assert!(
            !self.core.is_signed_in(),
            "Session should be cleared but is still authenticated"
        );
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
