// src/research.rs
//
// Research artifacts tracked against a project: papers and
// copyright/patent applications.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::current_user;
use crate::error::ApiError;
use crate::models::{CopyrightPatent, ResearchPaper};

#[derive(Debug, Deserialize)]
pub struct CreatePaperRequest {
    pub title: String,
    pub authors: Vec<String>,
    pub link: String,
    pub status: String,
    pub details: String,
    pub doi: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateIpRecordRequest {
    pub kind: String,
    pub title: String,
    pub application_number: String,
    pub status: String,
    pub document_url: Option<String>,
}

// POST /projects/{project_id}/research
pub async fn create_paper(
    req: HttpRequest,
    data: web::Data<AppState>,
    project_id: web::Path<String>,
    payload: web::Json<CreatePaperRequest>,
) -> Result<HttpResponse, ApiError> {
    let project_id = project_id.into_inner();
    current_user(&req)?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("paper title is required".to_string()));
    }
    if !["submitted", "accepted", "published"].contains(&payload.status.as_str()) {
        return Err(ApiError::Validation(format!(
            "invalid paper status: {}",
            payload.status
        )));
    }

    let paper = ResearchPaper {
        paper_id: Uuid::new_v4().to_string(),
        project_id,
        title: payload.title.clone(),
        authors: payload.authors.clone(),
        link: payload.link.clone(),
        status: payload.status.clone(),
        details: payload.details.clone(),
        doi: payload.doi.clone(),
        created_at: Utc::now(),
    };
    data.mongodb.research_papers().insert_one(&paper).await?;
    Ok(HttpResponse::Ok().json(paper))
}

// GET /projects/{project_id}/research
pub async fn list_papers(
    data: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let mut papers: Vec<ResearchPaper> = data
        .mongodb
        .research_papers()
        .find(doc! { "project_id": &*project_id })
        .await?
        .try_collect()
        .await?;
    papers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(HttpResponse::Ok().json(papers))
}

// POST /projects/{project_id}/ip
pub async fn create_ip_record(
    req: HttpRequest,
    data: web::Data<AppState>,
    project_id: web::Path<String>,
    payload: web::Json<CreateIpRecordRequest>,
) -> Result<HttpResponse, ApiError> {
    let project_id = project_id.into_inner();
    current_user(&req)?;

    if !["copyright", "patent"].contains(&payload.kind.as_str()) {
        return Err(ApiError::Validation(format!(
            "invalid record kind: {}",
            payload.kind
        )));
    }
    if !["pending", "approved", "rejected"].contains(&payload.status.as_str()) {
        return Err(ApiError::Validation(format!(
            "invalid record status: {}",
            payload.status
        )));
    }

    let record = CopyrightPatent {
        record_id: Uuid::new_v4().to_string(),
        project_id,
        kind: payload.kind.clone(),
        title: payload.title.clone(),
        application_number: payload.application_number.clone(),
        status: payload.status.clone(),
        document_url: payload.document_url.clone(),
        created_at: Utc::now(),
    };
    data.mongodb.copyright_patents().insert_one(&record).await?;
    Ok(HttpResponse::Ok().json(record))
}

// GET /projects/{project_id}/ip
pub async fn list_ip_records(
    data: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let mut records: Vec<CopyrightPatent> = data
        .mongodb
        .copyright_patents()
        .find(doc! { "project_id": &*project_id })
        .await?
        .try_collect()
        .await?;
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(HttpResponse::Ok().json(records))
}
