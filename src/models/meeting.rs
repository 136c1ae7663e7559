use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TaskStatus;

/// Embedded in a meeting document, not a separate entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub description: String,
    pub assigned_to: String,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub meeting_id: String,
    pub project_id: String,
    pub date: DateTime<Utc>,
    pub attendee_ids: Vec<String>,
    pub agenda_points: Vec<String>,
    pub action_items: Vec<ActionItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: String,
    pub project_id: String,
    pub task_id: Option<String>,
    pub progress_log_id: Option<String>,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only student update against a task. Never updated or deleted
/// after creation. `file_urls` are opaque blob-store URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressLog {
    pub log_id: String,
    pub project_id: String,
    pub task_id: String,
    pub user_id: String,
    pub description: String,
    pub percent_complete: i32,
    pub next_steps: String,
    pub file_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}
