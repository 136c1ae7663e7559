use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The project-scoped student roster. `member_ids` keeps insertion order
/// (join order); `leader_id` is empty when no leader is set and must
/// otherwise reference a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: String,
    pub name: String,
    pub project_id: String,
    pub member_ids: Vec<String>,
    pub leader_id: String,
    pub max_members: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Admin-scoped cohort of students assigned to a teacher, independent of
/// any team or project. Mutations here never emit notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentGroup {
    pub group_id: String,
    pub name: String,
    pub student_ids: Vec<String>,
    pub assigned_teacher_id: String,
    pub created_at: DateTime<Utc>,
}
