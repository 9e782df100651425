//! Taskboard Rust Client Library
//!
//! A Rust client for the Taskboard project and task manager, providing
//! authentication with a persistent session, typed project and task
//! services, route guarding and view models for every screen.

pub mod error;
pub mod router;
pub mod views;

use std::sync::Arc;

use reqwest::Client;

pub use taskboard_rust_api as api;
pub use taskboard_rust_auth as auth;
pub use taskboard_rust_projects as projects;
pub use taskboard_rust_tasks as tasks;

use crate::api::{ApiClient, ClientOptions, MemoryStorage, TokenStorage};
use crate::auth::{AuthClient, Session, SessionStore};
use crate::error::Result;
use crate::projects::ProjectClient;
use crate::router::{Navigation, Route, Router};
use crate::tasks::TaskClient;
use crate::views::{
    DashboardView, FormMode, ProjectDetailView, ProjectForm, ProjectListView, TaskDetailView,
    TaskForm, TaskListView,
};

/// The main entry point for the Taskboard Rust client
///
/// Owns the one [`SessionStore`] of the application; views and services are
/// handed out from here.
#[derive(Debug, Clone)]
pub struct Taskboard {
    api: ApiClient,
    session: SessionStore,
    projects: ProjectClient,
    tasks: TaskClient,
}

impl Taskboard {
    /// Create a new client keeping the token in memory
    ///
    /// # Example
    ///
    /// ```
    /// use taskboard_rust::Taskboard;
    ///
    /// let taskboard = Taskboard::new("http://localhost:8000/api").unwrap();
    /// assert!(!taskboard.session().authenticated);
    /// ```
    pub fn new(base_url: &str) -> Result<Self> {
        Self::new_with_options(
            ClientOptions::default().with_base_url(base_url),
            Arc::new(MemoryStorage::new()),
        )
    }

    /// Create a new client with custom options and token storage
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use taskboard_rust::Taskboard;
    /// use taskboard_rust::api::{ClientOptions, FileStorage};
    ///
    /// let options = ClientOptions::default().with_base_url("http://localhost:8000/api");
    /// let storage = Arc::new(FileStorage::new("/tmp/taskboard-storage.json"));
    /// let taskboard = Taskboard::new_with_options(options, storage).unwrap();
    /// ```
    pub fn new_with_options(
        options: ClientOptions,
        storage: Arc<dyn TokenStorage>,
    ) -> Result<Self> {
        let api = ApiClient::new(options, storage)?;
        Ok(Self::from_api(api))
    }

    /// Create a new client around an existing reqwest client
    pub fn with_http_client(
        options: ClientOptions,
        storage: Arc<dyn TokenStorage>,
        http_client: Client,
    ) -> Self {
        Self::from_api(ApiClient::with_http_client(options, storage, http_client))
    }

    fn from_api(api: ApiClient) -> Self {
        Self {
            session: SessionStore::new(AuthClient::new(api.clone())),
            projects: ProjectClient::new(api.clone()),
            tasks: TaskClient::new(api.clone()),
            api,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn auth(&self) -> &AuthClient {
        self.session_store().auth()
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.session
    }

    /// Current session snapshot
    pub fn session(&self) -> Session {
        self.session.session()
    }

    pub fn projects(&self) -> &ProjectClient {
        &self.projects
    }

    pub fn tasks(&self) -> &TaskClient {
        &self.tasks
    }

    /// Resolve `path` against the current session
    pub fn navigate(&self, path: &str) -> Navigation {
        Router::navigate(path, &self.session())
    }

    pub fn navigate_to(&self, route: Route) -> Navigation {
        Router::navigate_to(route, &self.session())
    }

    pub fn dashboard_view(&self) -> DashboardView {
        DashboardView::new(self.projects.clone(), self.tasks.clone())
    }

    pub fn project_list_view(&self) -> ProjectListView {
        ProjectListView::new(self.projects.clone())
    }

    pub fn project_detail_view(&self, project_id: i64) -> ProjectDetailView {
        ProjectDetailView::new(self.projects.clone(), project_id)
    }

    pub fn project_form(&self, mode: FormMode) -> ProjectForm {
        ProjectForm::new(self.projects.clone(), mode)
    }

    pub fn task_list_view(&self) -> TaskListView {
        TaskListView::new(self.tasks.clone(), self.projects.clone())
    }

    pub fn task_detail_view(&self, task_id: i64) -> TaskDetailView {
        TaskDetailView::new(self.tasks.clone(), self.projects.clone(), task_id)
    }

    pub fn task_form(&self, mode: FormMode) -> TaskForm {
        TaskForm::new(self.tasks.clone(), self.projects.clone(), mode)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::api::{ClientOptions, FileStorage, MemoryStorage, TokenStorage};
    pub use crate::auth::{Session, SessionStore, User};
    pub use crate::error::Error;
    pub use crate::projects::{Project, ProjectCreate, ProjectUpdate, ProjectWithTasks};
    pub use crate::router::{GuardDecision, Route, Router};
    pub use crate::tasks::{Task, TaskCreate, TaskFilter, TaskPriority, TaskStatus, TaskUpdate};
    pub use crate::views::FormMode;
    pub use crate::Taskboard;
}
