use taskly_api::endpoints::tasks::Task;
use taskly_api::endpoints::users::User;

/// What the UI renders: the signed-in user and their tasks.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub user: Option<User>,
    pub tasks: Vec<Task>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the task list, newest first.
    pub fn set_tasks(&mut self, mut tasks: Vec<Task>) {
        tasks.sort();
        self.tasks = tasks;
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len() - self.completed_count()
    }
}
