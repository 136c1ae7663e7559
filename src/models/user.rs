use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Teacher,
    Admin,
}

/// Represents an account in the system. Team membership is not stored
/// here; `Team.member_ids` is the single source of truth and "teams of a
/// user" is a derived read (see users::get_user_teams).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub hashed_password: String,
    pub role: UserRole,
    pub enrollment_number: Option<String>,
    pub contact_number: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub cabin_no: Option<String>,
    pub technical_skills: Option<Vec<String>>,
    pub non_technical_skills: Option<Vec<String>>,
    pub project_role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response projection of a user without the password hash.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub enrollment_number: Option<String>,
    pub contact_number: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub cabin_no: Option<String>,
    pub technical_skills: Option<Vec<String>>,
    pub non_technical_skills: Option<Vec<String>>,
    pub project_role: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            user_id: user.user_id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            enrollment_number: user.enrollment_number,
            contact_number: user.contact_number,
            department: user.department,
            designation: user.designation,
            cabin_no: user.cabin_no,
            technical_skills: user.technical_skills,
            non_technical_skills: user.non_technical_skills,
            project_role: user.project_role,
            created_at: user.created_at,
        }
    }
}
