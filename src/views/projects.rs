//! Project list and project detail screens

use log::warn;
use taskboard_rust_projects::{Project, ProjectClient, ProjectWithTasks};
use taskboard_rust_tasks::{Task, TaskStatus};

use crate::router::Route;
use crate::views::confirm::DeleteDialog;

/// All projects of the current user
#[derive(Debug)]
pub struct ProjectListView {
    client: ProjectClient,
    projects: Vec<Project>,
    loading: bool,
    error: Option<String>,
    delete_dialog: DeleteDialog<Project>,
}

impl ProjectListView {
    pub fn new(client: ProjectClient) -> Self {
        Self {
            client,
            projects: Vec::new(),
            loading: true,
            error: None,
            delete_dialog: DeleteDialog::new(),
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn refresh(&mut self) {
        self.loading = true;

        match self.client.list().await {
            Ok(projects) => {
                self.projects = projects;
                self.error = None;
            }
            Err(e) => {
                warn!("Error fetching projects: {}", e);
                self.error = Some("Failed to load projects".to_string());
            }
        }

        self.loading = false;
    }

    /// Stage a project for deletion; false if it is not in the list
    pub fn request_delete(&mut self, project_id: i64) -> bool {
        match self.projects.iter().find(|p| p.id == project_id) {
            Some(project) => {
                self.delete_dialog.request(project.clone());
                true
            }
            None => false,
        }
    }

    pub fn pending_delete(&self) -> Option<&Project> {
        self.delete_dialog.target()
    }

    pub fn cancel_delete(&mut self) {
        self.delete_dialog.cancel();
    }

    pub async fn confirm_delete(&mut self) -> bool {
        let project_id = match self.delete_dialog.target() {
            Some(project) => project.id,
            None => return false,
        };

        match self.client.delete(project_id).await {
            Ok(_) => {
                self.projects.retain(|p| p.id != project_id);
                self.delete_dialog.cancel();
                true
            }
            Err(e) => {
                warn!("Error deleting project {}: {}", project_id, e);
                self.error = Some("Failed to delete project".to_string());
                false
            }
        }
    }
}

/// One project with its tasks
#[derive(Debug)]
pub struct ProjectDetailView {
    client: ProjectClient,
    project_id: i64,
    project: Option<ProjectWithTasks>,
    loading: bool,
    error: Option<String>,
    delete_dialog: DeleteDialog<i64>,
}

impl ProjectDetailView {
    pub fn new(client: ProjectClient, project_id: i64) -> Self {
        Self {
            client,
            project_id,
            project: None,
            loading: true,
            error: None,
            delete_dialog: DeleteDialog::new(),
        }
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref().map(|p| &p.project)
    }

    pub fn tasks(&self) -> &[Task] {
        self.project
            .as_ref()
            .map(|p| p.tasks.as_slice())
            .unwrap_or_default()
    }

    /// Number of this project's tasks in `status`
    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks().iter().filter(|t| t.status == status).count()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load(&mut self) {
        self.loading = true;

        match self.client.get(self.project_id).await {
            Ok(project) => {
                self.project = Some(project);
                self.error = None;
            }
            Err(e) => {
                warn!("Error fetching project {}: {}", self.project_id, e);
                self.error = Some(if e.is_not_found() {
                    "Project not found".to_string()
                } else {
                    "Failed to load project".to_string()
                });
            }
        }

        self.loading = false;
    }

    pub fn request_delete(&mut self) {
        self.delete_dialog.request(self.project_id);
    }

    pub fn is_delete_pending(&self) -> bool {
        self.delete_dialog.is_open()
    }

    pub fn cancel_delete(&mut self) {
        self.delete_dialog.cancel();
    }

    /// Delete the project; returns where to navigate on success
    pub async fn confirm_delete(&mut self) -> Option<Route> {
        let project_id = *self.delete_dialog.target()?;

        match self.client.delete(project_id).await {
            Ok(_) => {
                self.delete_dialog.cancel();
                self.project = None;
                Some(Route::Projects)
            }
            Err(e) => {
                warn!("Error deleting project {}: {}", project_id, e);
                self.error = Some("Failed to delete project".to_string());
                None
            }
        }
    }
}
