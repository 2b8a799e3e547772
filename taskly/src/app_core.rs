use crate::error::AppError;
use crate::preferences::Preferences;
use crate::state::AppState;
use crate::validators;
use futures::future::join_all;
use secrecy::SecretString;
use std::sync::Arc;
use taskly_api::endpoints::tasks::{SearchTasks, SearchTasksResponse, Task, UpdateTask};
use taskly_api::endpoints::users::User;
use taskly_api::{Client, Request, SessionStore};
use taskly_auth::AuthService;

/// Application core without any rendering.
///
/// Owns the task list and profile the UI shows, and keeps them in step with
/// the server after every mutation.
pub struct AppCore {
    auth: AuthService,
    preferences: Preferences,
    state: AppState,
}

impl AppCore {
    pub fn new(auth: AuthService) -> Self {
        let preferences = Preferences::new(auth.session().storage());
        Self {
            auth,
            preferences,
            state: AppState::new(),
        }
    }

    /// Get read-only access to the current state (for rendering or assertions)
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.auth.session()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session().is_authenticated()
    }

    fn client(&self) -> &Client {
        self.auth.client()
    }

    // Session

    /// Validate a stored session and load the task list.
    ///
    /// A session that cannot be revived is signed out locally. A failing task
    /// fetch is logged and leaves the list empty.
    pub async fn start(&mut self) -> Result<Option<User>, AppError> {
        let Some(user) = self.auth.restore().await? else {
            self.state = AppState::new();
            return Ok(None);
        };

        self.apply_profile(&user)?;
        self.refetch_tasks().await;
        Ok(Some(user))
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: impl Into<SecretString>,
    ) -> Result<User, AppError> {
        let name = validators::validate_display_name(name).map_err(AppError::Validation)?;
        Ok(self.auth.register(name, email.trim(), password).await?)
    }

    pub async fn sign_in(
        &mut self,
        email: &str,
        password: impl Into<SecretString>,
    ) -> Result<User, AppError> {
        let user = self.auth.login(email.trim(), password).await?;
        self.apply_profile(&user)?;
        self.refetch_tasks().await;
        Ok(user)
    }

    /// Sign out remotely when possible and forget everything user-specific.
    pub async fn sign_out(&mut self) {
        self.auth.logout().await;
        self.state = AppState::new();
        self.preferences.clear_profile();
    }

    // Tasks

    /// Refetch the task list. A missing list or an expired session leaves it empty.
    pub async fn load_tasks(&mut self) -> Result<&[Task], AppError> {
        let tasks = match self.client().send(Request::tasks().list()).await {
            Ok(tasks) => tasks,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) if e.is_session_expired() => {
                tracing::warn!("Session expired while loading tasks");
                self.state.user = None;
                self.preferences.clear_profile();
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(count = tasks.len(), "Loaded tasks");
        self.state.set_tasks(tasks);
        Ok(&self.state.tasks)
    }

    /// Refetch after a change that already happened; a failure only leaves the list stale.
    async fn refetch_tasks(&mut self) {
        if let Err(e) = self.load_tasks().await {
            tracing::error!("Failed to fetch tasks: {}", e);
        }
    }

    pub async fn task(&self, task_id: &str) -> Result<Task, AppError> {
        Ok(self.client().send(Request::tasks().get(task_id)).await?)
    }

    pub async fn create_task(
        &mut self,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, AppError> {
        let title = validators::validate_title(title).map_err(AppError::Validation)?;

        let mut request = Request::tasks().create(title);
        if let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) {
            request = request.description(description);
        }

        let task = self.client().send(request).await?;
        tracing::info!(task_id = %task.id, "Created task");
        self.refetch_tasks().await;
        Ok(task)
    }

    pub async fn update_task(&mut self, request: UpdateTask) -> Result<Task, AppError> {
        let task = self.client().send(request).await?;
        tracing::info!(task_id = %task.id, "Updated task");
        self.refetch_tasks().await;
        Ok(task)
    }

    /// Flip a task's completion flag.
    pub async fn toggle_task(&mut self, task_id: &str) -> Result<Task, AppError> {
        let completed = match self.state.task(task_id) {
            Some(task) => task.completed,
            None => self.task(task_id).await?.completed,
        };

        let request = Request::tasks().update(task_id).completed(!completed);
        self.update_task(request).await
    }

    pub async fn delete_task(&mut self, task_id: &str) -> Result<(), AppError> {
        self.client().send(Request::tasks().delete(task_id)).await?;
        tracing::info!(task_id, "Deleted task");
        self.refetch_tasks().await;
        Ok(())
    }

    pub async fn search_tasks(&self, query: SearchTasks) -> Result<SearchTasksResponse, AppError> {
        Ok(self.client().send(query).await?)
    }

    /// Delete every task on the server, concurrently. Returns how many were removed.
    pub async fn clear_all_tasks(&mut self) -> Result<usize, AppError> {
        let tasks = match self.client().send(Request::tasks().list()).await {
            Ok(tasks) => tasks,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let client = self.client();
        let results = join_all(
            tasks
                .iter()
                .map(move |task| client.send(Request::tasks().delete(task.id.as_str()))),
        )
        .await;

        let deleted = results.iter().filter(|result| result.is_ok()).count();
        if let Some(e) = results.into_iter().find_map(Result::err) {
            tracing::error!(deleted, total = tasks.len(), "Failed to clear tasks: {}", e);
            self.refetch_tasks().await;
            return Err(e.into());
        }

        tracing::info!(deleted, "Cleared all tasks");
        self.state.tasks.clear();
        Ok(deleted)
    }

    // Preferences

    pub fn dark_mode(&self) -> bool {
        self.preferences.dark_mode()
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), AppError> {
        Ok(self.preferences.set_dark_mode(enabled)?)
    }

    pub fn display_name(&self) -> Option<String> {
        self.preferences.display_name()
    }

    /// Set the locally shown name without touching the server.
    pub fn set_display_name(&self, name: &str) -> Result<(), AppError> {
        Ok(self.preferences.set_display_name(name)?)
    }

    pub fn profile_picture(&self) -> Option<String> {
        self.preferences.profile_picture()
    }

    // Profile

    pub async fn refresh_profile(&mut self) -> Result<User, AppError> {
        let user = self.auth.current_user().await?;
        self.apply_profile(&user)?;
        Ok(user)
    }

    pub async fn update_display_name(&mut self, name: &str) -> Result<User, AppError> {
        let name = validators::validate_display_name(name).map_err(AppError::Validation)?;

        let user = self
            .client()
            .send(Request::users().update_current().name(name))
            .await?;
        self.apply_profile(&user)?;
        Ok(user)
    }

    pub async fn upload_avatar(
        &mut self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<User, AppError> {
        validators::validate_avatar(content_type, bytes.len()).map_err(AppError::InvalidAvatar)?;

        let user = self
            .client()
            .send(Request::users().upload_avatar(file_name, content_type, bytes))
            .await?;
        tracing::info!("Uploaded avatar");
        self.apply_profile(&user)?;
        Ok(user)
    }

    pub async fn remove_avatar(&mut self) -> Result<(), AppError> {
        self.client().send(Request::users().delete_avatar()).await?;
        self.preferences.clear_profile_picture()?;

        if let Some(user) = self.state.user.as_mut() {
            user.avatar_url = None;
        }
        if let Some(user) = self.state.user.clone() {
            self.session().set_identity(user);
        }
        tracing::info!("Removed avatar");
        Ok(())
    }

    fn apply_profile(&mut self, user: &User) -> Result<(), AppError> {
        self.session().set_identity(user.clone());
        self.preferences.set_display_name(&user.name)?;
        match self.client().avatar_url(user.avatar_url.as_deref()) {
            Some(url) => self.preferences.set_profile_picture(&url)?,
            None => self.preferences.clear_profile_picture()?,
        }
        self.state.user = Some(user.clone());
        Ok(())
    }
}
