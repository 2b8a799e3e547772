use crate::endpoints::{
    auth::{Login, RefreshAccessToken, Register},
    tasks::{CreateTask, DeleteTask, GetTask, ListTasks, SearchTasks, UpdateTask},
    users::{DeleteAvatar, GetCurrentUser, Logout, UpdateCurrentUser, UploadAvatar},
};
use secrecy::SecretString;

pub struct AuthRepository;

impl AuthRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn register(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Register {
        Register::new(name, email, password)
    }

    pub fn login(&self, email: impl Into<String>, password: impl Into<SecretString>) -> Login {
        Login::new(email, password)
    }

    pub fn refresh(&self, refresh_token: impl Into<String>) -> RefreshAccessToken {
        RefreshAccessToken::new(refresh_token)
    }

    pub fn logout(&self, refresh_token: impl Into<String>) -> Logout {
        Logout::new(refresh_token)
    }
}

pub struct TaskRepository;

impl TaskRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self) -> ListTasks {
        ListTasks::new()
    }

    pub fn get(&self, task_id: impl Into<String>) -> GetTask {
        GetTask::new(task_id)
    }

    pub fn create(&self, title: impl Into<String>) -> CreateTask {
        CreateTask::new(title)
    }

    pub fn update(&self, task_id: impl Into<String>) -> UpdateTask {
        UpdateTask::new(task_id)
    }

    pub fn delete(&self, task_id: impl Into<String>) -> DeleteTask {
        DeleteTask::new(task_id)
    }

    pub fn search(&self) -> SearchTasks {
        SearchTasks::new()
    }
}

pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn current(&self) -> GetCurrentUser {
        GetCurrentUser::new()
    }

    pub fn update_current(&self) -> UpdateCurrentUser {
        UpdateCurrentUser::new()
    }

    pub fn upload_avatar(
        &self,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> UploadAvatar {
        UploadAvatar::new(file_name, content_type, bytes)
    }

    pub fn delete_avatar(&self) -> DeleteAvatar {
        DeleteAvatar::new()
    }
}
