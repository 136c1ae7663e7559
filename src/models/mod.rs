mod meeting;
mod notification;
mod project;
mod research;
mod sprint;
mod team;
mod user;

pub use meeting::{ActionItem, Comment, Meeting, ProgressLog};
pub use notification::{Notification, NotificationKind};
pub use project::{Project, ProjectEvaluation, ProjectStatus};
pub use research::{CopyrightPatent, ResearchPaper};
pub use sprint::{Sprint, Task, TaskStatus};
pub use team::{StudentGroup, Team};
pub use user::{User, UserProfile, UserRole};
