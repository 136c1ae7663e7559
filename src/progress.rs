// src/progress.rs
//
// Read-only aggregation over fetched snapshots. Everything here is
// deterministic, side-effect-free and tolerates empty input; the analytics
// handlers below fetch the raw records and hand them to these functions.

use actix_web::{web, HttpResponse};
use chrono::{Days, Local, NaiveDate};
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use serde::Serialize;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::{ProgressLog, Project, ProjectStatus, Sprint, Task, TaskStatus};

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct MemberStats {
    pub completed: usize,
    pub total: usize,
    pub percentage: i32,
}

/// Completion ratio of the tasks assigned to one member. Percentage is 0
/// when the member has no tasks.
pub fn member_stats(tasks: &[Task], member_id: &str) -> MemberStats {
    let total = tasks
        .iter()
        .filter(|t| t.assigned_to.iter().any(|id| id == member_id))
        .count();
    let completed = tasks
        .iter()
        .filter(|t| {
            t.status == TaskStatus::Completed && t.assigned_to.iter().any(|id| id == member_id)
        })
        .count();
    let percentage = if total == 0 {
        0
    } else {
        (completed as f64 / total as f64 * 100.0).round() as i32
    };
    MemberStats {
        completed,
        total,
        percentage,
    }
}

/// Mean `percent_complete` over a sprint's tasks, rounded; 0 with no tasks.
pub fn sprint_completion(tasks: &[Task], sprint_id: &str) -> i32 {
    let sprint_tasks: Vec<&Task> = tasks.iter().filter(|t| t.sprint_id == sprint_id).collect();
    if sprint_tasks.is_empty() {
        return 0;
    }
    let sum: f64 = sprint_tasks.iter().map(|t| t.percent_complete as f64).sum();
    (sum / sprint_tasks.len() as f64).round() as i32
}

/// Mean of the stored, teacher-entered `percent_complete` fields. Not
/// recomputed from tasks.
pub fn project_average_progress(projects: &[Project]) -> i32 {
    if projects.is_empty() {
        return 0;
    }
    let sum: f64 = projects.iter().map(|p| p.percent_complete as f64).sum();
    (sum / projects.len() as f64).round() as i32
}

/// Tally per status in the fixed legend order: not_started, in_progress,
/// review, blocked, completed.
pub fn status_histogram(tasks: &[Task]) -> Vec<(TaskStatus, usize)> {
    TaskStatus::ALL
        .iter()
        .map(|&status| (status, tasks.iter().filter(|t| t.status == status).count()))
        .collect()
}

/// Progress-log counts for the trailing `window_days` calendar days,
/// oldest first, today inclusive. Days are bucketed in the process-local
/// time zone, matching how the logs were entered.
pub fn daily_activity_trend(logs: &[ProgressLog], window_days: usize) -> Vec<usize> {
    trend_ending(logs, window_days, Local::now().date_naive())
}

fn trend_ending(logs: &[ProgressLog], window_days: usize, last_day: NaiveDate) -> Vec<usize> {
    (0..window_days)
        .rev()
        .map(|back| {
            let day = last_day - Days::new(back as u64);
            logs.iter()
                .filter(|log| log.created_at.with_timezone(&Local).date_naive() == day)
                .count()
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct SprintCompletion {
    sprint_number: u32,
    name: String,
    percentage: i32,
}

/// GET /projects/{project_id}/analytics
/// Everything the project charts need in one response: status histogram,
/// per-sprint completion, the 7-day activity trend and per-member stats.
pub async fn project_analytics(
    data: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let project = data
        .mongodb
        .projects()
        .find_one(doc! { "project_id": &*project_id })
        .await?
        .ok_or(ApiError::NotFound("project"))?;

    let tasks: Vec<Task> = data
        .mongodb
        .tasks()
        .find(doc! { "project_id": &*project_id })
        .await?
        .try_collect()
        .await?;
    let mut sprints: Vec<Sprint> = data
        .mongodb
        .sprints()
        .find(doc! { "project_id": &*project_id })
        .await?
        .try_collect()
        .await?;
    let logs: Vec<ProgressLog> = data
        .mongodb
        .progress_logs()
        .find(doc! { "project_id": &*project_id })
        .await?
        .try_collect()
        .await?;

    sprints.sort_by_key(|s| s.sprint_number);
    let sprint_progress: Vec<SprintCompletion> = sprints
        .iter()
        .map(|s| SprintCompletion {
            sprint_number: s.sprint_number,
            name: s.name.clone(),
            percentage: sprint_completion(&tasks, &s.sprint_id),
        })
        .collect();

    let member_progress: Vec<serde_json::Value> = if project.team_id.is_empty() {
        Vec::new()
    } else {
        match data
            .mongodb
            .teams()
            .find_one(doc! { "team_id": &project.team_id })
            .await?
        {
            Some(team) => team
                .member_ids
                .iter()
                .map(|member_id| {
                    let stats = member_stats(&tasks, member_id);
                    serde_json::json!({ "member_id": member_id, "stats": stats })
                })
                .collect(),
            None => Vec::new(),
        }
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "project_id": project.project_id,
        "percent_complete": project.percent_complete,
        "task_status": status_histogram(&tasks),
        "sprint_completion": sprint_progress,
        "activity_trend": daily_activity_trend(&logs, 7),
        "member_progress": member_progress,
    })))
}

/// GET /analytics/overview
/// Cross-project summary for the dashboard: status distribution and the
/// average of the stored project progress fields.
pub async fn overview(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let projects: Vec<Project> = data
        .mongodb
        .projects()
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    let count_by = |status: ProjectStatus| projects.iter().filter(|p| p.status == status).count();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "total_projects": projects.len(),
        "average_progress": project_average_progress(&projects),
        "project_status": {
            "planning": count_by(ProjectStatus::Planning),
            "active": count_by(ProjectStatus::Active),
            "on_hold": count_by(ProjectStatus::OnHold),
            "completed": count_by(ProjectStatus::Completed),
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn task(sprint_id: &str, status: TaskStatus, assigned_to: &[&str], percent: i32) -> Task {
        let now = Utc::now();
        Task {
            task_id: "t".to_string(),
            sprint_id: sprint_id.to_string(),
            project_id: "p1".to_string(),
            task_number: 1,
            title: "task".to_string(),
            sub_tasks: Vec::new(),
            status,
            assigned_to: assigned_to.iter().map(|s| s.to_string()).collect(),
            assigned_date: now,
            deadline: now,
            start_date: None,
            completion_date: None,
            percent_complete: percent,
            created_at: now,
            updated_at: now,
        }
    }

    fn log_at(created_at: chrono::DateTime<Utc>) -> ProgressLog {
        ProgressLog {
            log_id: "l".to_string(),
            project_id: "p1".to_string(),
            task_id: "t1".to_string(),
            user_id: "u1".to_string(),
            description: "update".to_string(),
            percent_complete: 10,
            next_steps: String::new(),
            file_urls: Vec::new(),
            created_at,
        }
    }

    #[test]
    fn member_stats_empty_is_zero() {
        let stats = member_stats(&[], "m1");
        assert_eq!(
            stats,
            MemberStats {
                completed: 0,
                total: 0,
                percentage: 0
            }
        );
    }

    #[test]
    fn member_stats_half_completed() {
        // 4 tasks for M: 2 completed, 2 not started.
        let tasks = vec![
            task("s1", TaskStatus::Completed, &["m1"], 100),
            task("s1", TaskStatus::Completed, &["m1", "m2"], 100),
            task("s1", TaskStatus::NotStarted, &["m1"], 0),
            task("s1", TaskStatus::NotStarted, &["m1"], 0),
            task("s1", TaskStatus::Completed, &["m2"], 100),
        ];
        let stats = member_stats(&tasks, "m1");
        assert_eq!(
            stats,
            MemberStats {
                completed: 2,
                total: 4,
                percentage: 50
            }
        );
    }

    #[test]
    fn member_stats_rounds_percentage() {
        let tasks = vec![
            task("s1", TaskStatus::Completed, &["m1"], 100),
            task("s1", TaskStatus::NotStarted, &["m1"], 0),
            task("s1", TaskStatus::NotStarted, &["m1"], 0),
        ];
        assert_eq!(member_stats(&tasks, "m1").percentage, 33);
    }

    #[test]
    fn sprint_completion_averages_and_rounds() {
        let tasks = vec![
            task("s1", TaskStatus::InProgress, &[], 50),
            task("s1", TaskStatus::InProgress, &[], 25),
            task("s2", TaskStatus::Completed, &[], 100),
        ];
        assert_eq!(sprint_completion(&tasks, "s1"), 38); // 37.5 rounds up
        assert_eq!(sprint_completion(&tasks, "s2"), 100);
        assert_eq!(sprint_completion(&tasks, "s3"), 0);
    }

    #[test]
    fn project_average_uses_stored_field() {
        assert_eq!(project_average_progress(&[]), 0);
    }

    #[test]
    fn histogram_order_is_stable() {
        let tasks = vec![
            task("s1", TaskStatus::Completed, &[], 100),
            task("s1", TaskStatus::Blocked, &[], 10),
            task("s1", TaskStatus::Completed, &[], 100),
            task("s1", TaskStatus::Review, &[], 90),
        ];
        let histogram = status_histogram(&tasks);
        let statuses: Vec<TaskStatus> = histogram.iter().map(|(s, _)| *s).collect();
        assert_eq!(statuses, TaskStatus::ALL.to_vec());
        let counts: Vec<usize> = histogram.iter().map(|(_, c)| *c).collect();
        assert_eq!(counts, vec![0, 0, 1, 1, 2]);
    }

    #[test]
    fn trend_buckets_by_calendar_day() {
        let day = |y, m, d, h| {
            Local
                .with_ymd_and_hms(y, m, d, h, 0, 0)
                .unwrap()
                .with_timezone(&Utc)
        };
        let logs = vec![
            log_at(day(2026, 3, 10, 9)),
            log_at(day(2026, 3, 10, 18)),
            log_at(day(2026, 3, 12, 12)),
            log_at(day(2026, 3, 1, 12)), // outside the window
        ];
        let last_day = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();
        let trend = trend_ending(&logs, 7, last_day);
        assert_eq!(trend.len(), 7);
        // Mar 6 .. Mar 12, oldest first.
        assert_eq!(trend, vec![0, 0, 0, 0, 2, 0, 1]);
    }

    #[test]
    fn trend_tolerates_empty_logs() {
        assert_eq!(daily_activity_trend(&[], 7), vec![0; 7]);
    }
}
