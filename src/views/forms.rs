//! Create and edit forms for projects and tasks

use chrono::NaiveDate;
use log::{info, warn};
use taskboard_rust_api::ApiError;
use taskboard_rust_projects::{Project, ProjectClient, ProjectCreate, ProjectUpdate};
use taskboard_rust_tasks::{Task, TaskClient, TaskCreate, TaskPriority, TaskStatus, TaskUpdate};

use crate::error::Error;
use crate::router::Route;

/// Whether a form creates a new entity or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

/// A successful submission and where to go next
#[derive(Debug, Clone, PartialEq)]
pub struct Saved<T> {
    pub entity: T,
    pub redirect: Route,
}

fn save_error(err: &ApiError, fallback: &str) -> String {
    err.detail().unwrap_or(fallback).to_string()
}

/// Project form state
#[derive(Debug)]
pub struct ProjectForm {
    client: ProjectClient,
    mode: FormMode,
    pub name: String,
    pub description: String,
    loading: bool,
    submitting: bool,
    error: Option<String>,
}

impl ProjectForm {
    pub fn new(client: ProjectClient, mode: FormMode) -> Self {
        Self {
            client,
            mode,
            name: String::new(),
            description: String::new(),
            loading: matches!(mode, FormMode::Edit(_)),
            submitting: false,
            error: None,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The submit button is disabled while a submission is in flight
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// In edit mode, fill the fields from the stored project
    pub async fn load(&mut self) {
        let id = match self.mode {
            FormMode::Edit(id) => id,
            FormMode::Create => return,
        };

        self.loading = true;
        match self.client.get(id).await {
            Ok(project) => {
                self.name = project.project.name;
                self.description = project.project.description.unwrap_or_default();
                self.error = None;
            }
            Err(e) => {
                warn!("Error fetching project {}: {}", id, e);
                self.error = Some("Failed to load project".to_string());
            }
        }
        self.loading = false;
    }

    pub async fn submit(&mut self) -> Option<Saved<Project>> {
        self.submitting = true;
        self.error = None;

        let description = Some(self.description.clone()).filter(|d| !d.is_empty());
        let result = match self.mode {
            FormMode::Create => {
                let payload = ProjectCreate {
                    name: self.name.clone(),
                    description,
                };
                self.client.create(&payload).await
            }
            FormMode::Edit(id) => {
                let payload = ProjectUpdate {
                    name: Some(self.name.clone()),
                    description: Some(self.description.clone()),
                };
                self.client.update(id, &payload).await
            }
        };

        self.submitting = false;
        match result {
            Ok(project) => {
                info!("Saved project {}", project.id);
                Some(Saved {
                    redirect: Route::ProjectDetail(project.id),
                    entity: project,
                })
            }
            Err(e) => {
                warn!("Error saving project: {}", e);
                self.error = Some(save_error(&e, "Failed to save project"));
                None
            }
        }
    }
}

/// Task form state
#[derive(Debug)]
pub struct TaskForm {
    tasks_client: TaskClient,
    projects_client: ProjectClient,
    mode: FormMode,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub project_id: Option<i64>,
    pub assigned_user_id: Option<i64>,
    projects: Vec<Project>,
    loading: bool,
    submitting: bool,
    error: Option<String>,
}

impl TaskForm {
    pub fn new(tasks_client: TaskClient, projects_client: ProjectClient, mode: FormMode) -> Self {
        Self {
            tasks_client,
            projects_client,
            mode,
            title: String::new(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
            project_id: None,
            assigned_user_id: None,
            projects: Vec::new(),
            loading: true,
            submitting: false,
            error: None,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Projects offered in the project selector
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn fill(&mut self, task: Task) {
        self.title = task.title;
        self.description = task.description.unwrap_or_default();
        self.status = task.status;
        self.priority = task.priority;
        self.due_date = task.due_date.map(|d| d.date());
        self.project_id = Some(task.project_id);
        self.assigned_user_id = task.assigned_user_id;
    }

    /// Load the project selector and, in edit mode, the task itself
    pub async fn load(&mut self) {
        self.loading = true;

        let result = match self.mode {
            FormMode::Create => self.projects_client.list().await.map(|p| (None, p)),
            FormMode::Edit(id) => tokio::try_join!(
                self.tasks_client.get(id),
                self.projects_client.list()
            )
            .map(|(task, projects)| (Some(task), projects)),
        };

        match result {
            Ok((task, projects)) => {
                self.projects = projects;
                if let Some(task) = task {
                    self.fill(task);
                }
                self.error = None;
            }
            Err(e) => {
                warn!("Error loading task form: {}", e);
                self.error = Some(match self.mode {
                    FormMode::Create => "Failed to load projects".to_string(),
                    FormMode::Edit(_) => "Failed to load task".to_string(),
                });
            }
        }

        self.loading = false;
    }

    pub async fn submit(&mut self) -> Option<Saved<Task>> {
        self.error = None;

        let project_id = match self.project_id {
            Some(id) => id,
            None => {
                self.error = Some(Error::form("Select a project").to_string());
                return None;
            }
        };

        self.submitting = true;
        let due_date = self.due_date.and_then(|d| d.and_hms_opt(0, 0, 0));
        let description = Some(self.description.clone()).filter(|d| !d.is_empty());

        let result = match self.mode {
            FormMode::Create => {
                let payload = TaskCreate {
                    title: self.title.clone(),
                    description,
                    status: Some(self.status),
                    priority: Some(self.priority),
                    due_date,
                    project_id,
                    assigned_user_id: self.assigned_user_id,
                };
                self.tasks_client.create(&payload).await
            }
            FormMode::Edit(id) => {
                let payload = TaskUpdate {
                    title: Some(self.title.clone()),
                    description: Some(self.description.clone()),
                    status: Some(self.status),
                    priority: Some(self.priority),
                    due_date: Some(due_date),
                    project_id: Some(project_id),
                    assigned_user_id: Some(self.assigned_user_id),
                };
                self.tasks_client.update(id, &payload).await
            }
        };

        self.submitting = false;
        match result {
            Ok(task) => {
                info!("Saved task {}", task.id);
                Some(Saved {
                    redirect: Route::TaskDetail(task.id),
                    entity: task,
                })
            }
            Err(e) => {
                warn!("Error saving task: {}", e);
                self.error = Some(save_error(&e, "Failed to save task"));
                None
            }
        }
    }
}
