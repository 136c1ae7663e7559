use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchPaper {
    pub paper_id: String,
    pub project_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub link: String,
    pub status: String, // "submitted", "accepted" or "published"
    pub details: String,
    pub doi: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyrightPatent {
    pub record_id: String,
    pub project_id: String,
    pub kind: String, // "copyright" or "patent"
    pub title: String,
    pub application_number: String,
    pub status: String, // "pending", "approved" or "rejected"
    pub document_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
