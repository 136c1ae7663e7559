// src/store.rs

use mongodb::{options::ClientOptions, Client, Collection, Database};

use crate::models::{
    Comment, CopyrightPatent, Meeting, Notification, ProgressLog, Project, ResearchPaper, Sprint,
    StudentGroup, Task, Team, User,
};

/// Shared handle to the document store. One collection per record family;
/// every query the handlers issue is a plain equality filter, anything
/// fancier (ordering, combined predicates) happens client-side after fetch.
pub struct MongoDB {
    pub client: Client,
    pub db: Database,
}

impl MongoDB {
    pub async fn init(uri: &str, db_name: &str) -> Self {
        let client_options = ClientOptions::parse(uri)
            .await
            .expect("Failed to parse MongoDB connection string");
        let client = Client::with_options(client_options).expect("Failed to initialize client");
        let db = client.database(db_name);
        MongoDB { client, db }
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn teams(&self) -> Collection<Team> {
        self.db.collection("teams")
    }

    pub fn student_groups(&self) -> Collection<StudentGroup> {
        self.db.collection("student_groups")
    }

    pub fn projects(&self) -> Collection<Project> {
        self.db.collection("projects")
    }

    pub fn sprints(&self) -> Collection<Sprint> {
        self.db.collection("sprints")
    }

    pub fn tasks(&self) -> Collection<Task> {
        self.db.collection("tasks")
    }

    pub fn meetings(&self) -> Collection<Meeting> {
        self.db.collection("meetings")
    }

    pub fn comments(&self) -> Collection<Comment> {
        self.db.collection("comments")
    }

    pub fn progress_logs(&self) -> Collection<ProgressLog> {
        self.db.collection("progress_logs")
    }

    pub fn notifications(&self) -> Collection<Notification> {
        self.db.collection("notifications")
    }

    pub fn research_papers(&self) -> Collection<ResearchPaper> {
        self.db.collection("research_papers")
    }

    pub fn copyright_patents(&self) -> Collection<CopyrightPatent> {
        self.db.collection("copyright_patents")
    }
}
