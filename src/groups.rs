// src/groups.rs
//
// Admin-scoped student cohorts. Groups use a separate, non-notifying path
// from team rosters: no fan-out on any mutation here.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures_util::TryStreamExt;
use log::info;
use mongodb::bson::{doc, to_bson};
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::{current_user, require_role};
use crate::error::ApiError;
use crate::models::{StudentGroup, User, UserRole};
use crate::roster::auto_partition;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub student_ids: Vec<String>,
    pub assigned_teacher_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub student_ids: Option<Vec<String>>,
    pub assigned_teacher_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AutoAssignRequest {
    pub group_size: u32,
    pub teacher_id: String,
}

// GET /groups
pub async fn list_groups(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let groups: Vec<StudentGroup> = data
        .mongodb
        .student_groups()
        .find(doc! {})
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(groups))
}

// POST /groups
pub async fn create_group(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<CreateGroupRequest>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Admin).await?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("group name is required".to_string()));
    }
    if payload.assigned_teacher_id.trim().is_empty() {
        return Err(ApiError::Validation("please select a teacher".to_string()));
    }

    let group = StudentGroup {
        group_id: Uuid::new_v4().to_string(),
        name: payload.name.clone(),
        student_ids: payload.student_ids.clone(),
        assigned_teacher_id: payload.assigned_teacher_id.clone(),
        created_at: Utc::now(),
    };
    data.mongodb.student_groups().insert_one(&group).await?;
    Ok(HttpResponse::Ok().json(group))
}

// PUT /groups/{group_id}
pub async fn update_group(
    req: HttpRequest,
    data: web::Data<AppState>,
    group_id: web::Path<String>,
    payload: web::Json<UpdateGroupRequest>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Admin).await?;

    let mut set_doc = doc! {};
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("group name is required".to_string()));
        }
        set_doc.insert("name", name.clone());
    }
    if let Some(student_ids) = &payload.student_ids {
        set_doc.insert("student_ids", to_bson(student_ids)?);
    }
    if let Some(teacher_id) = &payload.assigned_teacher_id {
        set_doc.insert("assigned_teacher_id", teacher_id.clone());
    }
    if set_doc.is_empty() {
        return Err(ApiError::Validation("no fields to update".to_string()));
    }

    let result = data
        .mongodb
        .student_groups()
        .update_one(doc! { "group_id": &*group_id }, doc! { "$set": set_doc })
        .await?;
    if result.matched_count == 0 {
        return Err(ApiError::NotFound("group"));
    }
    Ok(HttpResponse::Ok().body("Group updated"))
}

// DELETE /groups/{group_id}
pub async fn delete_group(
    req: HttpRequest,
    data: web::Data<AppState>,
    group_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Admin).await?;

    let result = data
        .mongodb
        .student_groups()
        .delete_one(doc! { "group_id": &*group_id })
        .await?;
    if result.deleted_count == 0 {
        return Err(ApiError::NotFound("group"));
    }
    Ok(HttpResponse::Ok().body("Group deleted"))
}

/// POST /groups/auto-assign
/// Partitions every student not yet in any group into balanced groups
/// under one teacher. The pool is computed client-side from the full
/// student and group lists (the store only does equality filters).
pub async fn auto_assign(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<AutoAssignRequest>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Admin).await?;

    if payload.teacher_id.trim().is_empty() {
        return Err(ApiError::Validation("please select a teacher".to_string()));
    }

    let students: Vec<User> = data
        .mongodb
        .users()
        .find(doc! { "role": "student" })
        .await?
        .try_collect()
        .await?;
    let groups: Vec<StudentGroup> = data
        .mongodb
        .student_groups()
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    let unassigned: Vec<String> = students
        .iter()
        .filter(|s| !groups.iter().any(|g| g.student_ids.contains(&s.user_id)))
        .map(|s| s.user_id.clone())
        .collect();

    let chunks = auto_partition(
        &unassigned,
        payload.group_size as usize,
        &mut rand::thread_rng(),
    )?;

    let mut created = Vec::with_capacity(chunks.len());
    for (i, student_ids) in chunks.into_iter().enumerate() {
        let group = StudentGroup {
            group_id: Uuid::new_v4().to_string(),
            name: format!("Group {}", groups.len() + i + 1),
            student_ids,
            assigned_teacher_id: payload.teacher_id.clone(),
            created_at: Utc::now(),
        };
        data.mongodb.student_groups().insert_one(&group).await?;
        created.push(group);
    }

    info!("Auto-assigned {} students into {} groups", unassigned.len(), created.len());
    Ok(HttpResponse::Ok().json(created))
}
