// src/auth.rs

use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::info;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::{User, UserProfile, UserRole};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Deserialize)]
pub struct SignupInfo {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct LoginInfo {
    pub email: String,
    pub password: String,
}

pub fn create_jwt(user_id: &str, secret: &str) -> Result<String, ApiError> {
    let expiration = Utc::now() + Duration::hours(24);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn verify_token(token: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(token_data.claims.sub)
}

/// The actor id injected by the authentication middleware. Every mutating
/// handler resolves its caller through here instead of ambient state.
pub fn current_user(req: &HttpRequest) -> Result<String, ApiError> {
    req.extensions()
        .get::<String>()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))
}

/// Advisory role check. Authorization is ultimately enforced outside this
/// service; handlers gate their own surface so the UI gets a clean error.
pub async fn require_role(
    data: &AppState,
    user_id: &str,
    role: UserRole,
) -> Result<User, ApiError> {
    let user = data
        .mongodb
        .users()
        .find_one(doc! { "user_id": user_id })
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    if user.role != role && user.role != UserRole::Admin {
        return Err(ApiError::Unauthorized(format!(
            "requires {:?} role",
            role
        )));
    }
    Ok(user)
}

// POST /auth/signup
pub async fn signup(
    data: web::Data<AppState>,
    signup_info: web::Json<SignupInfo>,
) -> Result<HttpResponse, ApiError> {
    if signup_info.email.trim().is_empty() || signup_info.display_name.trim().is_empty() {
        return Err(ApiError::Validation(
            "email and display name are required".to_string(),
        ));
    }

    let users = data.mongodb.users();
    if users
        .find_one(doc! { "email": &signup_info.email })
        .await?
        .is_some()
    {
        return Err(ApiError::Validation("email already registered".to_string()));
    }

    let hashed_password = hash(&signup_info.password, DEFAULT_COST)?;
    let now = Utc::now();
    let new_user = User {
        user_id: Uuid::new_v4().to_string(),
        email: signup_info.email.clone(),
        display_name: signup_info.display_name.clone(),
        hashed_password,
        role: signup_info.role,
        enrollment_number: None,
        contact_number: None,
        department: None,
        designation: None,
        cabin_no: None,
        technical_skills: None,
        non_technical_skills: None,
        project_role: None,
        created_at: now,
        updated_at: now,
    };
    users.insert_one(&new_user).await?;

    info!("User {} signed up as {:?}", new_user.user_id, new_user.role);
    Ok(HttpResponse::Ok().json(UserProfile::from(new_user)))
}

// POST /auth/login
pub async fn login(
    data: web::Data<AppState>,
    login_info: web::Json<LoginInfo>,
) -> Result<HttpResponse, ApiError> {
    let users = data.mongodb.users();
    let user = users
        .find_one(doc! { "email": &login_info.email })
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify(&login_info.password, &user.hashed_password).unwrap_or(false) {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = create_jwt(&user.user_id, &data.config.jwt_secret)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "token": token,
        "user_id": user.user_id,
        "role": user.role,
    })))
}
