//! Landing screen after login: project and task totals

use log::warn;
use taskboard_rust_projects::{Project, ProjectClient};
use taskboard_rust_tasks::{Task, TaskClient, TaskFilter, TaskStatus};

/// Largest page the server hands out
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug)]
pub struct DashboardView {
    projects_client: ProjectClient,
    tasks_client: TaskClient,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
}

impl DashboardView {
    pub fn new(projects_client: ProjectClient, tasks_client: TaskClient) -> Self {
        Self {
            projects_client,
            tasks_client,
            projects: Vec::new(),
            tasks: Vec::new(),
            loading: true,
            error: None,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    /// `(status, count)` for every status, in workflow order
    pub fn status_counts(&self) -> Vec<(TaskStatus, usize)> {
        TaskStatus::ALL
            .iter()
            .map(|status| (*status, self.count(*status)))
            .collect()
    }

    pub async fn refresh(&mut self) {
        self.loading = true;

        let filter = TaskFilter::new().page(1, MAX_PAGE_SIZE);
        let result = tokio::try_join!(
            self.projects_client.list(),
            self.tasks_client.list(Some(&filter))
        );

        match result {
            Ok((projects, tasks)) => {
                self.projects = projects;
                self.tasks = tasks;
                self.error = None;
            }
            Err(e) => {
                warn!("Error fetching dashboard data: {}", e);
                self.error = Some("Failed to load dashboard".to_string());
            }
        }

        self.loading = false;
    }
}
