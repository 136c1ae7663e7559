// src/users.rs

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, to_bson};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::auth::current_user;
use crate::error::ApiError;
use crate::models::{Team, User, UserProfile, UserRole};

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub enrollment_number: Option<String>,
    pub contact_number: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub cabin_no: Option<String>,
    pub technical_skills: Option<Vec<String>>,
    pub non_technical_skills: Option<Vec<String>>,
    pub project_role: Option<String>,
}

// GET /users/{user_id}
pub async fn get_user(
    data: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = data
        .mongodb
        .users()
        .find_one(doc! { "user_id": &*user_id })
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

// PUT /users/{user_id}
// Users may only edit their own profile; admins may edit anyone's.
pub async fn update_profile(
    req: HttpRequest,
    data: web::Data<AppState>,
    user_id: web::Path<String>,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&req)?;
    if actor != *user_id {
        let caller = data
            .mongodb
            .users()
            .find_one(doc! { "user_id": &actor })
            .await?
            .ok_or(ApiError::NotFound("user"))?;
        if caller.role != UserRole::Admin {
            return Err(ApiError::Unauthorized(
                "Cannot edit another user's profile".to_string(),
            ));
        }
    }

    let mut set_doc = doc! {};
    if let Some(name) = &payload.display_name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("display name is required".to_string()));
        }
        set_doc.insert("display_name", name.clone());
    }
    if let Some(v) = &payload.enrollment_number {
        set_doc.insert("enrollment_number", v.clone());
    }
    if let Some(v) = &payload.contact_number {
        set_doc.insert("contact_number", v.clone());
    }
    if let Some(v) = &payload.department {
        set_doc.insert("department", v.clone());
    }
    if let Some(v) = &payload.designation {
        set_doc.insert("designation", v.clone());
    }
    if let Some(v) = &payload.cabin_no {
        set_doc.insert("cabin_no", v.clone());
    }
    if let Some(v) = &payload.technical_skills {
        set_doc.insert("technical_skills", to_bson(v)?);
    }
    if let Some(v) = &payload.non_technical_skills {
        set_doc.insert("non_technical_skills", to_bson(v)?);
    }
    if let Some(v) = &payload.project_role {
        set_doc.insert("project_role", v.clone());
    }
    if set_doc.is_empty() {
        return Err(ApiError::Validation("no fields to update".to_string()));
    }
    set_doc.insert("updated_at", to_bson(&Utc::now())?);

    let result = data
        .mongodb
        .users()
        .update_one(doc! { "user_id": &*user_id }, doc! { "$set": set_doc })
        .await?;
    if result.matched_count == 0 {
        return Err(ApiError::NotFound("user"));
    }
    Ok(HttpResponse::Ok().body("Profile updated"))
}

// GET /users/teachers
pub async fn list_teachers(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    list_by_role(data, "teacher").await
}

// GET /users/students
pub async fn list_students(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    list_by_role(data, "student").await
}

async fn list_by_role(data: web::Data<AppState>, role: &str) -> Result<HttpResponse, ApiError> {
    let users: Vec<User> = data
        .mongodb
        .users()
        .find(doc! { "role": role })
        .await?
        .try_collect()
        .await?;
    let profiles: Vec<UserProfile> = users.into_iter().map(UserProfile::from).collect();
    Ok(HttpResponse::Ok().json(profiles))
}

/// GET /users/{user_id}/teams
/// Derived read: membership lives only on the team documents, so "teams
/// of a user" is a containment filter on `member_ids`.
pub async fn get_user_teams(
    data: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let teams: Vec<Team> = data
        .mongodb
        .teams()
        .find(doc! { "member_ids": &*user_id })
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(teams))
}

/// GET /teams/{team_id}/members
/// Resolves the roster to user profiles, preserving join order.
pub async fn get_team_members(
    data: web::Data<AppState>,
    team_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let team = data
        .mongodb
        .teams()
        .find_one(doc! { "team_id": &*team_id })
        .await?
        .ok_or(ApiError::NotFound("team"))?;

    let mut members = Vec::with_capacity(team.member_ids.len());
    for member_id in &team.member_ids {
        if let Some(user) = data
            .mongodb
            .users()
            .find_one(doc! { "user_id": member_id })
            .await?
        {
            members.push(UserProfile::from(user));
        }
    }
    Ok(HttpResponse::Ok().json(members))
}
