// src/error.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use thiserror::Error;

/// Crate-wide error taxonomy. Validation failures are raised before any
/// write is attempted; store failures are wrapped as `Persistence` with
/// the driver error attached for logging and are never retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("team is full (limit: {limit} members)")]
    CapacityExceeded { limit: usize },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(String),

    #[error("storage error")]
    Persistence(#[from] mongodb::error::Error),

    #[error("serialization error")]
    Serialize(#[from] mongodb::bson::ser::Error),

    #[error("token error")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing error")]
    Hash(#[from] bcrypt::BcryptError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Persistence(_) | ApiError::Serialize(_) | ApiError::Hash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Token(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Persistence(cause) => {
                error!("Storage error: {}", cause);
                HttpResponse::InternalServerError().body("Storage error")
            }
            ApiError::Serialize(cause) => {
                error!("Serialization error: {}", cause);
                HttpResponse::InternalServerError().body("Storage error")
            }
            ApiError::Hash(cause) => {
                error!("Password hashing error: {}", cause);
                HttpResponse::InternalServerError().body("Internal error")
            }
            other => HttpResponse::build(other.status_code()).body(other.to_string()),
        }
    }
}
