use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub name: String,
    pub description: String,
    pub domain: String,
    pub sdg: String,
    /// Teacher-entered overall progress. Authoritative as stored; never
    /// recomputed from tasks.
    pub percent_complete: i32,
    pub status: ProjectStatus,
    pub cabin_location: String,
    pub tech_transfer_status: String,
    pub achievements: String,
    pub github_link: String,
    /// Empty until a team is created for the project.
    pub team_id: String,
    pub teacher_id: String,
    pub evaluation: Option<ProjectEvaluation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review marks for a project. `total_score` is the sum of the four
/// components, computed when the evaluation is written. The UI labels the
/// total "out of 100" but no bound is enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEvaluation {
    pub review1_marks: f64,
    pub review2_marks: f64,
    pub review3_marks: f64,
    pub final_marks: f64,
    pub total_score: f64,
    pub feedback: String,
    pub updated_at: DateTime<Utc>,
}
