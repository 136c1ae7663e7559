// src/sprint.rs
//
// Sprints and their tasks. Sprint numbers are 1-based, assigned as
// count+1 at creation and never reused; task numbers work the same way
// within a sprint.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use log::info;
use mongodb::bson::{doc, to_bson};
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::current_user;
use crate::error::ApiError;
use crate::models::{NotificationKind, Sprint, Task, TaskStatus};
use crate::notification::notify_user_best_effort;

#[derive(Debug, Deserialize)]
pub struct CreateSprintRequest {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSprintRequest {
    pub name: Option<String>,
    pub status: Option<TaskStatus>,
    pub percent_complete: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub sub_tasks: Option<Vec<String>>,
    pub assigned_to: Vec<String>,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub sub_tasks: Option<Vec<String>>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Vec<String>>,
    pub deadline: Option<DateTime<Utc>>,
    pub percent_complete: Option<i32>,
}

// POST /projects/{project_id}/sprints
pub async fn create_sprint(
    req: HttpRequest,
    data: web::Data<AppState>,
    project_id: web::Path<String>,
    payload: web::Json<CreateSprintRequest>,
) -> Result<HttpResponse, ApiError> {
    let project_id = project_id.into_inner();
    current_user(&req)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("sprint name is required".to_string()));
    }
    if data
        .mongodb
        .projects()
        .find_one(doc! { "project_id": &project_id })
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("project"));
    }

    let existing = data
        .mongodb
        .sprints()
        .count_documents(doc! { "project_id": &project_id })
        .await?;

    let sprint = Sprint {
        sprint_id: Uuid::new_v4().to_string(),
        project_id: project_id.clone(),
        sprint_number: existing as u32 + 1,
        name: payload.name.clone(),
        start_date: payload.start_date,
        end_date: payload.end_date,
        status: TaskStatus::NotStarted,
        percent_complete: 0,
        created_at: Utc::now(),
    };
    data.mongodb.sprints().insert_one(&sprint).await?;

    info!("Sprint {} ({}) created for project {}", sprint.sprint_number, sprint.sprint_id, project_id);
    Ok(HttpResponse::Ok().json(sprint))
}

// GET /projects/{project_id}/sprints
pub async fn list_sprints(
    data: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let mut sprints: Vec<Sprint> = data
        .mongodb
        .sprints()
        .find(doc! { "project_id": &*project_id })
        .await?
        .try_collect()
        .await?;
    sprints.sort_by_key(|s| s.sprint_number);
    Ok(HttpResponse::Ok().json(sprints))
}

// PUT /sprints/{sprint_id}
pub async fn update_sprint(
    req: HttpRequest,
    data: web::Data<AppState>,
    sprint_id: web::Path<String>,
    payload: web::Json<UpdateSprintRequest>,
) -> Result<HttpResponse, ApiError> {
    current_user(&req)?;

    let mut set_doc = doc! {};
    if let Some(name) = &payload.name {
        set_doc.insert("name", name.clone());
    }
    if let Some(status) = &payload.status {
        set_doc.insert("status", to_bson(status)?);
    }
    if let Some(percent) = payload.percent_complete {
        set_doc.insert("percent_complete", percent);
    }
    if let Some(start) = &payload.start_date {
        set_doc.insert("start_date", to_bson(start)?);
    }
    if let Some(end) = &payload.end_date {
        set_doc.insert("end_date", to_bson(end)?);
    }
    if set_doc.is_empty() {
        return Err(ApiError::Validation("no fields to update".to_string()));
    }

    let result = data
        .mongodb
        .sprints()
        .update_one(doc! { "sprint_id": &*sprint_id }, doc! { "$set": set_doc })
        .await?;
    if result.matched_count == 0 {
        return Err(ApiError::NotFound("sprint"));
    }
    Ok(HttpResponse::Ok().body("Sprint updated"))
}

// POST /sprints/{sprint_id}/tasks
pub async fn create_task(
    req: HttpRequest,
    data: web::Data<AppState>,
    sprint_id: web::Path<String>,
    payload: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    current_user(&req)?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("task title is required".to_string()));
    }
    let sprint = data
        .mongodb
        .sprints()
        .find_one(doc! { "sprint_id": &*sprint_id })
        .await?
        .ok_or(ApiError::NotFound("sprint"))?;

    let existing = data
        .mongodb
        .tasks()
        .count_documents(doc! { "sprint_id": &*sprint_id })
        .await?;

    let now = Utc::now();
    let task = Task {
        task_id: Uuid::new_v4().to_string(),
        sprint_id: sprint.sprint_id.clone(),
        project_id: sprint.project_id.clone(),
        task_number: existing as u32 + 1,
        title: payload.title.clone(),
        sub_tasks: payload.sub_tasks.clone().unwrap_or_default(),
        status: TaskStatus::NotStarted,
        assigned_to: payload.assigned_to.clone(),
        assigned_date: now,
        deadline: payload.deadline,
        start_date: None,
        completion_date: None,
        percent_complete: 0,
        created_at: now,
        updated_at: now,
    };
    data.mongodb.tasks().insert_one(&task).await?;
    Ok(HttpResponse::Ok().json(task))
}

// GET /sprints/{sprint_id}/tasks
pub async fn list_sprint_tasks(
    data: web::Data<AppState>,
    sprint_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let mut tasks: Vec<Task> = data
        .mongodb
        .tasks()
        .find(doc! { "sprint_id": &*sprint_id })
        .await?
        .try_collect()
        .await?;
    tasks.sort_by_key(|t| t.task_number);
    Ok(HttpResponse::Ok().json(tasks))
}

// GET /projects/{project_id}/tasks
pub async fn list_project_tasks(
    data: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let mut tasks: Vec<Task> = data
        .mongodb
        .tasks()
        .find(doc! { "project_id": &*project_id })
        .await?
        .try_collect()
        .await?;
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(HttpResponse::Ok().json(tasks))
}

/// PUT /tasks/{task_id}
/// `percent_complete` is independent of status, except that moving to
/// completed forces it to 100 and stamps the completion date. Assignees
/// are notified of status changes after the write lands.
pub async fn update_task(
    req: HttpRequest,
    data: web::Data<AppState>,
    task_id: web::Path<String>,
    payload: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    current_user(&req)?;

    let task = data
        .mongodb
        .tasks()
        .find_one(doc! { "task_id": &*task_id })
        .await?
        .ok_or(ApiError::NotFound("task"))?;

    if let Some(percent) = payload.percent_complete {
        if !(0..=100).contains(&percent) {
            return Err(ApiError::Validation(
                "percent_complete must be between 0 and 100".to_string(),
            ));
        }
    }

    let mut set_doc = doc! {};
    if let Some(title) = &payload.title {
        set_doc.insert("title", title.clone());
    }
    if let Some(sub_tasks) = &payload.sub_tasks {
        set_doc.insert("sub_tasks", to_bson(sub_tasks)?);
    }
    if let Some(assigned_to) = &payload.assigned_to {
        set_doc.insert("assigned_to", to_bson(assigned_to)?);
    }
    if let Some(deadline) = &payload.deadline {
        set_doc.insert("deadline", to_bson(deadline)?);
    }
    if let Some(percent) = payload.percent_complete {
        set_doc.insert("percent_complete", percent);
    }
    let status_changed = match payload.status {
        Some(status) => {
            set_doc.insert("status", to_bson(&status)?);
            match status {
                TaskStatus::Completed => {
                    set_doc.insert("percent_complete", 100);
                    set_doc.insert("completion_date", to_bson(&Utc::now())?);
                }
                TaskStatus::InProgress if task.start_date.is_none() => {
                    set_doc.insert("start_date", to_bson(&Utc::now())?);
                }
                _ => {}
            }
            status != task.status
        }
        None => false,
    };
    if set_doc.is_empty() {
        return Err(ApiError::Validation("no fields to update".to_string()));
    }
    set_doc.insert("updated_at", to_bson(&Utc::now())?);

    data.mongodb
        .tasks()
        .update_one(doc! { "task_id": &*task_id }, doc! { "$set": set_doc })
        .await?;

    if status_changed {
        for assignee in &task.assigned_to {
            notify_user_best_effort(
                &data,
                assignee,
                NotificationKind::TaskUpdate,
                &format!("Task \"{}\" status changed", task.title),
                &format!("/projects/{}", task.project_id),
            )
            .await;
        }
    }

    Ok(HttpResponse::Ok().body("Task updated"))
}

// DELETE /tasks/{task_id}
pub async fn delete_task(
    req: HttpRequest,
    data: web::Data<AppState>,
    task_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    current_user(&req)?;

    let result = data
        .mongodb
        .tasks()
        .delete_one(doc! { "task_id": &*task_id })
        .await?;
    if result.deleted_count == 0 {
        return Err(ApiError::NotFound("task"));
    }
    Ok(HttpResponse::Ok().body("Task deleted"))
}
