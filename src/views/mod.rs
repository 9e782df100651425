//! View models for every screen
//!
//! Each view owns its local state and the service clients it needs. Fetch
//! failures become an inline `error` message; the view never panics or
//! propagates them, and data loaded earlier stays visible.

mod confirm;
mod dashboard;
mod forms;
mod projects;
mod tasks;

pub use confirm::DeleteDialog;
pub use dashboard::DashboardView;
pub use forms::{FormMode, ProjectForm, Saved, TaskForm};
pub use projects::{ProjectDetailView, ProjectListView};
pub use tasks::{TaskDetailView, TaskListView};
