// src/meeting.rs
//
// Meetings (with embedded action items), comments and progress logs.
// Progress logs are append-only: no update or delete path exists.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use log::warn;
use mongodb::bson::{doc, to_bson};
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::current_user;
use crate::error::ApiError;
use crate::models::{ActionItem, Comment, Meeting, NotificationKind, ProgressLog};
use crate::notification::notify_team;

#[derive(Debug, Deserialize)]
pub struct CreateMeetingRequest {
    pub date: DateTime<Utc>,
    pub attendee_ids: Vec<String>,
    pub agenda_points: Vec<String>,
    pub action_items: Vec<ActionItem>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeetingRequest {
    pub date: Option<DateTime<Utc>>,
    pub attendee_ids: Option<Vec<String>>,
    pub agenda_points: Option<Vec<String>>,
    pub action_items: Option<Vec<ActionItem>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub task_id: Option<String>,
    pub progress_log_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProgressLogRequest {
    pub task_id: String,
    pub description: String,
    pub percent_complete: i32,
    pub next_steps: Option<String>,
    pub file_urls: Option<Vec<String>>,
}

/// POST /projects/{project_id}/meetings
/// The meeting write lands first; the team notification is best-effort.
pub async fn create_meeting(
    req: HttpRequest,
    data: web::Data<AppState>,
    project_id: web::Path<String>,
    payload: web::Json<CreateMeetingRequest>,
) -> Result<HttpResponse, ApiError> {
    let project_id = project_id.into_inner();
    current_user(&req)?;

    let project = data
        .mongodb
        .projects()
        .find_one(doc! { "project_id": &project_id })
        .await?
        .ok_or(ApiError::NotFound("project"))?;

    let meeting = Meeting {
        meeting_id: Uuid::new_v4().to_string(),
        project_id,
        date: payload.date,
        attendee_ids: payload.attendee_ids.clone(),
        agenda_points: payload.agenda_points.clone(),
        action_items: payload.action_items.clone(),
        created_at: Utc::now(),
    };
    data.mongodb.meetings().insert_one(&meeting).await?;

    if !project.team_id.is_empty() {
        if let Err(e) = notify_team(
            &data,
            &project.team_id,
            NotificationKind::Meeting,
            &format!("New meeting logged for {}", project.name),
            "/meetings",
        )
        .await
        {
            warn!("Failed to notify team {} of meeting: {}", project.team_id, e);
        }
    }

    Ok(HttpResponse::Ok().json(meeting))
}

// GET /projects/{project_id}/meetings
pub async fn list_meetings(
    data: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let mut meetings: Vec<Meeting> = data
        .mongodb
        .meetings()
        .find(doc! { "project_id": &*project_id })
        .await?
        .try_collect()
        .await?;
    meetings.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(HttpResponse::Ok().json(meetings))
}

// PUT /meetings/{meeting_id}
pub async fn update_meeting(
    req: HttpRequest,
    data: web::Data<AppState>,
    meeting_id: web::Path<String>,
    payload: web::Json<UpdateMeetingRequest>,
) -> Result<HttpResponse, ApiError> {
    current_user(&req)?;

    let mut set_doc = doc! {};
    if let Some(date) = &payload.date {
        set_doc.insert("date", to_bson(date)?);
    }
    if let Some(attendees) = &payload.attendee_ids {
        set_doc.insert("attendee_ids", to_bson(attendees)?);
    }
    if let Some(agenda) = &payload.agenda_points {
        set_doc.insert("agenda_points", to_bson(agenda)?);
    }
    if let Some(items) = &payload.action_items {
        set_doc.insert("action_items", to_bson(items)?);
    }
    if set_doc.is_empty() {
        return Err(ApiError::Validation("no fields to update".to_string()));
    }

    let result = data
        .mongodb
        .meetings()
        .update_one(doc! { "meeting_id": &*meeting_id }, doc! { "$set": set_doc })
        .await?;
    if result.matched_count == 0 {
        return Err(ApiError::NotFound("meeting"));
    }
    Ok(HttpResponse::Ok().body("Meeting updated"))
}

// POST /projects/{project_id}/comments
pub async fn create_comment(
    req: HttpRequest,
    data: web::Data<AppState>,
    project_id: web::Path<String>,
    payload: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, ApiError> {
    let project_id = project_id.into_inner();
    let actor = current_user(&req)?;

    if payload.content.trim().is_empty() {
        return Err(ApiError::Validation("comment cannot be empty".to_string()));
    }
    let project = data
        .mongodb
        .projects()
        .find_one(doc! { "project_id": &project_id })
        .await?
        .ok_or(ApiError::NotFound("project"))?;

    let comment = Comment {
        comment_id: Uuid::new_v4().to_string(),
        project_id,
        task_id: payload.task_id.clone(),
        progress_log_id: payload.progress_log_id.clone(),
        user_id: actor,
        content: payload.content.clone(),
        created_at: Utc::now(),
    };
    data.mongodb.comments().insert_one(&comment).await?;

    if !project.team_id.is_empty() {
        if let Err(e) = notify_team(
            &data,
            &project.team_id,
            NotificationKind::Comment,
            &format!("New comment on {}", project.name),
            &format!("/projects/{}", project.project_id),
        )
        .await
        {
            warn!("Failed to notify team {} of comment: {}", project.team_id, e);
        }
    }

    Ok(HttpResponse::Ok().json(comment))
}

// GET /projects/{project_id}/comments
pub async fn list_comments(
    data: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let mut comments: Vec<Comment> = data
        .mongodb
        .comments()
        .find(doc! { "project_id": &*project_id })
        .await?
        .try_collect()
        .await?;
    comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /projects/{project_id}/logs
/// File URLs arrive already uploaded to the blob store and are stored as
/// opaque strings.
pub async fn create_progress_log(
    req: HttpRequest,
    data: web::Data<AppState>,
    project_id: web::Path<String>,
    payload: web::Json<CreateProgressLogRequest>,
) -> Result<HttpResponse, ApiError> {
    let project_id = project_id.into_inner();
    let actor = current_user(&req)?;

    if payload.description.trim().is_empty() {
        return Err(ApiError::Validation("description is required".to_string()));
    }
    if !(0..=100).contains(&payload.percent_complete) {
        return Err(ApiError::Validation(
            "percent_complete must be between 0 and 100".to_string(),
        ));
    }
    if data
        .mongodb
        .tasks()
        .find_one(doc! { "task_id": &payload.task_id })
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("task"));
    }

    let log = ProgressLog {
        log_id: Uuid::new_v4().to_string(),
        project_id,
        task_id: payload.task_id.clone(),
        user_id: actor,
        description: payload.description.clone(),
        percent_complete: payload.percent_complete,
        next_steps: payload.next_steps.clone().unwrap_or_default(),
        file_urls: payload.file_urls.clone().unwrap_or_default(),
        created_at: Utc::now(),
    };
    data.mongodb.progress_logs().insert_one(&log).await?;
    Ok(HttpResponse::Ok().json(log))
}

// GET /projects/{project_id}/logs
pub async fn list_progress_logs(
    data: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let mut logs: Vec<ProgressLog> = data
        .mongodb
        .progress_logs()
        .find(doc! { "project_id": &*project_id })
        .await?
        .try_collect()
        .await?;
    logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(HttpResponse::Ok().json(logs))
}
