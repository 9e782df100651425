//! Taskboard project service for Rust
//!
//! Typed wrappers over the `/projects/` endpoints. Fetching a single
//! project also returns its tasks.

use log::debug;
use serde::{Deserialize, Serialize};
use taskboard_rust_api::{ApiClient, Result};
use taskboard_rust_tasks::Task;

/// A project as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner_id: i64,
}

/// A project together with its tasks, as returned by `GET /projects/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectWithTasks {
    #[serde(flatten)]
    pub project: Project,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Payload for `POST /projects/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProjectCreate {
    pub fn new(name: &str, description: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            description: description.map(str::to_string),
        }
    }
}

/// Payload for `PATCH /projects/{id}`; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Client for the `/projects/` endpoints
#[derive(Debug, Clone)]
pub struct ProjectClient {
    api: ApiClient,
}

impl ProjectClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List the current user's projects
    pub async fn list(&self) -> Result<Vec<Project>> {
        self.api.get("/projects/").execute().await
    }

    /// Fetch one project including its tasks
    pub async fn get(&self, id: i64) -> Result<ProjectWithTasks> {
        debug!("Fetching project {}", id);
        self.api.get(&format!("/projects/{}", id)).execute().await
    }

    pub async fn create(&self, project: &ProjectCreate) -> Result<Project> {
        self.api.post("/projects/").json(project)?.execute().await
    }

    pub async fn update(&self, id: i64, project: &ProjectUpdate) -> Result<Project> {
        self.api
            .patch(&format!("/projects/{}", id))
            .json(project)?
            .execute()
            .await
    }

    /// Delete a project, returning the server's last representation of it
    pub async fn delete(&self, id: i64) -> Result<Project> {
        self.api.delete(&format!("/projects/{}", id)).execute().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_with_tasks_flattens() {
        let project: ProjectWithTasks = serde_json::from_value(json!({
            "id": 3,
            "name": "Website",
            "description": "Relaunch",
            "owner_id": 1,
            "tasks": [{
                "id": 1,
                "title": "Wireframes",
                "status": "TODO",
                "priority": "LOW",
                "project_id": 3
            }]
        }))
        .unwrap();

        assert_eq!(project.project.name, "Website");
        assert_eq!(project.tasks.len(), 1);
        assert_eq!(project.tasks[0].project_id, 3);
    }

    #[test]
    fn test_update_serializes_present_fields() {
        let update = ProjectUpdate {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"name": "Renamed"})
        );
    }
}
