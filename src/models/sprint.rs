use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shared status scale for sprints, tasks and meeting action items.
/// Variant order matches the chart legend and must stay stable; the
/// status histogram tallies in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Review,
    Blocked,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Blocked,
        TaskStatus::Completed,
    ];
}

/// A time-boxed subdivision of a project. `sprint_number` is 1-based and
/// assigned as count+1 at creation; numbers are not reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    pub sprint_id: String,
    pub project_id: String,
    pub sprint_number: u32,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub percent_complete: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub sprint_id: String,
    /// Denormalized from the sprint so project-wide task queries stay a
    /// single equality filter.
    pub project_id: String,
    pub task_number: u32,
    pub title: String,
    pub sub_tasks: Vec<String>,
    pub status: TaskStatus,
    pub assigned_to: Vec<String>,
    pub assigned_date: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub start_date: Option<DateTime<Utc>>,
    pub completion_date: Option<DateTime<Utc>>,
    /// Independent of `status`, except that moving a task to `completed`
    /// forces this to 100.
    pub percent_complete: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
