// src/project.rs

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures_util::TryStreamExt;
use log::{debug, info};
use mongodb::bson::{doc, to_bson};
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::{current_user, require_role};
use crate::error::ApiError;
use crate::models::{Project, ProjectStatus, UserRole};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: String,
    pub domain: String,
    pub sdg: String,
    pub cabin_location: Option<String>,
    pub github_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub sdg: Option<String>,
    pub status: Option<ProjectStatus>,
    pub percent_complete: Option<i32>,
    pub cabin_location: Option<String>,
    pub tech_transfer_status: Option<String>,
    pub achievements: Option<String>,
    pub github_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub teacher_id: Option<String>,
    pub team_id: Option<String>,
}

/// POST /projects
/// Creates a project owned by the calling teacher. The team link stays
/// empty until a team is created for it.
pub async fn create_project(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse, ApiError> {
    debug!("create_project called with payload: {:?}", payload);
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Teacher).await?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("project name is required".to_string()));
    }

    let now = Utc::now();
    let new_project = Project {
        project_id: Uuid::new_v4().to_string(),
        name: payload.name.clone(),
        description: payload.description.clone(),
        domain: payload.domain.clone(),
        sdg: payload.sdg.clone(),
        percent_complete: 0,
        status: ProjectStatus::Planning,
        cabin_location: payload.cabin_location.clone().unwrap_or_default(),
        tech_transfer_status: String::new(),
        achievements: String::new(),
        github_link: payload.github_link.clone().unwrap_or_default(),
        team_id: String::new(),
        teacher_id: actor.clone(),
        evaluation: None,
        created_at: now,
        updated_at: now,
    };
    data.mongodb.projects().insert_one(&new_project).await?;

    info!("Project {} created by {}", new_project.project_id, actor);
    Ok(HttpResponse::Ok().json(new_project))
}

/// GET /projects?teacher_id=&team_id=
/// One equality filter at a time; ordering is applied after fetch.
pub async fn list_projects(
    data: web::Data<AppState>,
    query: web::Query<ProjectQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = if let Some(teacher_id) = &query.teacher_id {
        doc! { "teacher_id": teacher_id }
    } else if let Some(team_id) = &query.team_id {
        doc! { "team_id": team_id }
    } else {
        doc! {}
    };

    let mut projects: Vec<Project> = data
        .mongodb
        .projects()
        .find(filter)
        .await?
        .try_collect()
        .await?;
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(HttpResponse::Ok().json(projects))
}

// GET /projects/{project_id}
pub async fn get_project(
    data: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let project = data
        .mongodb
        .projects()
        .find_one(doc! { "project_id": &*project_id })
        .await?
        .ok_or(ApiError::NotFound("project"))?;
    Ok(HttpResponse::Ok().json(project))
}

// PUT /projects/{project_id}
pub async fn update_project(
    req: HttpRequest,
    data: web::Data<AppState>,
    project_id: web::Path<String>,
    payload: web::Json<UpdateProjectRequest>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Teacher).await?;

    if let Some(percent) = payload.percent_complete {
        if !(0..=100).contains(&percent) {
            return Err(ApiError::Validation(
                "percent_complete must be between 0 and 100".to_string(),
            ));
        }
    }

    let mut set_doc = doc! {};
    if let Some(name) = &payload.name {
        set_doc.insert("name", name.clone());
    }
    if let Some(description) = &payload.description {
        set_doc.insert("description", description.clone());
    }
    if let Some(domain) = &payload.domain {
        set_doc.insert("domain", domain.clone());
    }
    if let Some(sdg) = &payload.sdg {
        set_doc.insert("sdg", sdg.clone());
    }
    if let Some(status) = &payload.status {
        set_doc.insert("status", to_bson(status)?);
    }
    if let Some(percent) = payload.percent_complete {
        set_doc.insert("percent_complete", percent);
    }
    if let Some(cabin) = &payload.cabin_location {
        set_doc.insert("cabin_location", cabin.clone());
    }
    if let Some(tts) = &payload.tech_transfer_status {
        set_doc.insert("tech_transfer_status", tts.clone());
    }
    if let Some(achievements) = &payload.achievements {
        set_doc.insert("achievements", achievements.clone());
    }
    if let Some(link) = &payload.github_link {
        set_doc.insert("github_link", link.clone());
    }
    if set_doc.is_empty() {
        return Err(ApiError::Validation("no fields to update".to_string()));
    }
    set_doc.insert("updated_at", to_bson(&Utc::now())?);

    let result = data
        .mongodb
        .projects()
        .update_one(doc! { "project_id": &*project_id }, doc! { "$set": set_doc })
        .await?;
    if result.matched_count == 0 {
        return Err(ApiError::NotFound("project"));
    }
    Ok(HttpResponse::Ok().body("Project updated"))
}

// DELETE /projects/{project_id}
pub async fn delete_project(
    req: HttpRequest,
    data: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Teacher).await?;

    let result = data
        .mongodb
        .projects()
        .delete_one(doc! { "project_id": &*project_id })
        .await?;
    if result.deleted_count == 0 {
        return Err(ApiError::NotFound("project"));
    }
    info!("Project {} deleted by {}", project_id, actor);
    Ok(HttpResponse::Ok().body("Project deleted"))
}
