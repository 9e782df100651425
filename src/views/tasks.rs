//! Task list and task detail screens

use log::{debug, warn};
use taskboard_rust_projects::{Project, ProjectClient};
use taskboard_rust_tasks::{
    Task, TaskClient, TaskFilter, TaskPriority, TaskStatus, TaskUpdate,
};

use crate::router::Route;
use crate::views::confirm::DeleteDialog;

const UNKNOWN_PROJECT: &str = "Unknown Project";

/// Name of `project_id` within `projects`, or a placeholder label
pub(crate) fn project_name(projects: &[Project], project_id: i64) -> &str {
    projects
        .iter()
        .find(|p| p.id == project_id)
        .map(|p| p.name.as_str())
        .unwrap_or(UNKNOWN_PROJECT)
}

/// Filterable list of tasks with project labels
#[derive(Debug)]
pub struct TaskListView {
    tasks_client: TaskClient,
    projects_client: ProjectClient,
    filter: TaskFilter,
    tasks: Vec<Task>,
    projects: Vec<Project>,
    loading: bool,
    error: Option<String>,
    delete_dialog: DeleteDialog<Task>,
}

impl TaskListView {
    pub fn new(tasks_client: TaskClient, projects_client: ProjectClient) -> Self {
        Self {
            tasks_client,
            projects_client,
            filter: TaskFilter::default(),
            tasks: Vec::new(),
            projects: Vec::new(),
            loading: true,
            error: None,
            delete_dialog: DeleteDialog::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Nothing to show yet; render a spinner instead of the list
    pub fn shows_spinner(&self) -> bool {
        self.loading && self.tasks.is_empty()
    }

    pub fn has_filters(&self) -> bool {
        !self.filter.is_empty()
    }

    pub fn empty_message(&self) -> &'static str {
        if self.has_filters() {
            "Try changing your filters or create a new task"
        } else {
            "Create your first task to get started"
        }
    }

    pub fn project_name(&self, project_id: i64) -> &str {
        project_name(&self.projects, project_id)
    }

    /// Fetch tasks for the current filter and the projects used as labels.
    ///
    /// Both requests must finish before loading ends. On failure the
    /// previous lists stay in place.
    pub async fn refresh(&mut self) {
        self.loading = true;

        let result = tokio::try_join!(
            self.tasks_client.list(Some(&self.filter)),
            self.projects_client.list()
        );

        match result {
            Ok((tasks, projects)) => {
                debug!("Loaded {} task(s), {} project(s)", tasks.len(), projects.len());
                self.tasks = tasks;
                self.projects = projects;
                self.error = None;
            }
            Err(e) => {
                warn!("Error fetching tasks: {}", e);
                self.error = Some("Failed to load tasks".to_string());
            }
        }

        self.loading = false;
    }

    pub async fn set_status_filter(&mut self, status: Option<TaskStatus>) {
        self.filter.status = status;
        self.refresh().await;
    }

    pub async fn set_priority_filter(&mut self, priority: Option<TaskPriority>) {
        self.filter.priority = priority;
        self.refresh().await;
    }

    pub async fn set_project_filter(&mut self, project_id: Option<i64>) {
        self.filter.project_id = project_id;
        self.refresh().await;
    }

    /// Replace the whole filter, including sorting and paging
    pub async fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
        self.refresh().await;
    }

    /// Stage a task for deletion; false if it is not in the list
    pub fn request_delete(&mut self, task_id: i64) -> bool {
        match self.tasks.iter().find(|t| t.id == task_id) {
            Some(task) => {
                self.delete_dialog.request(task.clone());
                true
            }
            None => false,
        }
    }

    pub fn pending_delete(&self) -> Option<&Task> {
        self.delete_dialog.target()
    }

    pub fn cancel_delete(&mut self) {
        self.delete_dialog.cancel();
    }

    /// Delete the staged task. On success it is dropped from the list
    /// without re-fetching; on failure the list is left untouched.
    pub async fn confirm_delete(&mut self) -> bool {
        let task_id = match self.delete_dialog.target() {
            Some(task) => task.id,
            None => return false,
        };

        match self.tasks_client.delete(task_id).await {
            Ok(_) => {
                self.tasks.retain(|t| t.id != task_id);
                self.delete_dialog.cancel();
                true
            }
            Err(e) => {
                warn!("Error deleting task {}: {}", task_id, e);
                self.error = Some("Failed to delete task".to_string());
                false
            }
        }
    }
}

/// A single task with its project label
#[derive(Debug)]
pub struct TaskDetailView {
    tasks_client: TaskClient,
    projects_client: ProjectClient,
    task_id: i64,
    task: Option<Task>,
    projects: Vec<Project>,
    loading: bool,
    error: Option<String>,
    delete_dialog: DeleteDialog<i64>,
}

impl TaskDetailView {
    pub fn new(tasks_client: TaskClient, projects_client: ProjectClient, task_id: i64) -> Self {
        Self {
            tasks_client,
            projects_client,
            task_id,
            task: None,
            projects: Vec::new(),
            loading: true,
            error: None,
            delete_dialog: DeleteDialog::new(),
        }
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn project_name(&self) -> Option<&str> {
        self.task
            .as_ref()
            .map(|t| project_name(&self.projects, t.project_id))
    }

    pub async fn load(&mut self) {
        self.loading = true;

        let result = tokio::try_join!(
            self.tasks_client.get(self.task_id),
            self.projects_client.list()
        );

        match result {
            Ok((task, projects)) => {
                self.task = Some(task);
                self.projects = projects;
                self.error = None;
            }
            Err(e) => {
                warn!("Error fetching task {}: {}", self.task_id, e);
                self.error = Some(if e.is_not_found() {
                    "Task not found".to_string()
                } else {
                    "Failed to load task".to_string()
                });
            }
        }

        self.loading = false;
    }

    /// Move the task to another status
    pub async fn set_status(&mut self, status: TaskStatus) -> bool {
        let update = TaskUpdate {
            status: Some(status),
            ..Default::default()
        };

        match self.tasks_client.update(self.task_id, &update).await {
            Ok(task) => {
                self.task = Some(task);
                self.error = None;
                true
            }
            Err(e) => {
                warn!("Error updating task {}: {}", self.task_id, e);
                self.error = Some("Failed to update task".to_string());
                false
            }
        }
    }

    pub fn request_delete(&mut self) {
        self.delete_dialog.request(self.task_id);
    }

    pub fn is_delete_pending(&self) -> bool {
        self.delete_dialog.is_open()
    }

    pub fn cancel_delete(&mut self) {
        self.delete_dialog.cancel();
    }

    /// Delete the task; returns where to navigate on success
    pub async fn confirm_delete(&mut self) -> Option<Route> {
        let task_id = *self.delete_dialog.target()?;

        match self.tasks_client.delete(task_id).await {
            Ok(_) => {
                self.delete_dialog.cancel();
                self.task = None;
                Some(Route::Tasks)
            }
            Err(e) => {
                warn!("Error deleting task {}: {}", task_id, e);
                self.error = Some("Failed to delete task".to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_name_lookup() {
        let projects = vec![Project {
            id: 3,
            name: "Website".to_string(),
            description: None,
            owner_id: 1,
        }];

        assert_eq!(project_name(&projects, 3), "Website");
        assert_eq!(project_name(&projects, 4), "Unknown Project");
    }
}
