//! List filters for `GET /tasks/`

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{TaskPriority, TaskStatus};

/// Column the server sorts the task list by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSort {
    Priority,
    DueDate,
}

impl TaskSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskSort::Priority => "priority",
            TaskSort::DueDate => "due_date",
        }
    }
}

impl fmt::Display for TaskSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "priority" => Ok(TaskSort::Priority),
            "due_date" => Ok(TaskSort::DueDate),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Optional constraints forwarded to the server as query parameters.
///
/// Filtering, sorting and pagination all happen server side; unset fields
/// are left out of the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDateTime>,
    pub project_id: Option<i64>,
    pub sort: Option<TaskSort>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due_date(mut self, due_date: NaiveDateTime) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn project_id(mut self, project_id: i64) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn sort(mut self, sort: TaskSort, order: SortOrder) -> Self {
        self.sort = Some(sort);
        self.sort_order = Some(order);
        self
    }

    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }

    /// Query parameters for the present fields, in a stable order
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            params.push(("priority", priority.as_str().to_string()));
        }
        if let Some(due_date) = self.due_date {
            params.push(("due_date", due_date.format("%Y-%m-%dT%H:%M:%S").to_string()));
        }
        if let Some(project_id) = self.project_id {
            params.push(("project_id", project_id.to_string()));
        }
        if let Some(sort) = self.sort {
            params.push(("sort", sort.as_str().to_string()));
        }
        if let Some(order) = self.sort_order {
            params.push(("sort_order", order.as_str().to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_present_fields_are_serialized() {
        let filter = TaskFilter::new().status(TaskStatus::Done).project_id(3);

        assert_eq!(
            filter.to_query(),
            vec![
                ("status", "DONE".to_string()),
                ("project_id", "3".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_filter() {
        assert!(TaskFilter::default().is_empty());
        assert!(TaskFilter::default().to_query().is_empty());
    }

    #[test]
    fn test_full_filter() {
        let due = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let filter = TaskFilter::new()
            .status(TaskStatus::InProgress)
            .priority(TaskPriority::High)
            .due_date(due)
            .sort(TaskSort::DueDate, SortOrder::Desc)
            .page(2, 25);

        let query = filter.to_query();
        assert_eq!(query.len(), 7);
        assert!(query.contains(&("status", "IN_PROGRESS".to_string())));
        assert!(query.contains(&("priority", "HIGH".to_string())));
        assert!(query.contains(&("due_date", "2024-05-01T00:00:00".to_string())));
        assert!(query.contains(&("sort", "due_date".to_string())));
        assert!(query.contains(&("sort_order", "desc".to_string())));
        assert!(query.contains(&("page", "2".to_string())));
        assert!(query.contains(&("limit", "25".to_string())));
    }

    #[test]
    fn test_parse_sort_options() {
        assert_eq!("due-date".parse::<TaskSort>(), Ok(TaskSort::DueDate));
        assert_eq!("DESC".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert!("name".parse::<TaskSort>().is_err());
    }
}
