// src/evaluation.rs

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::info;
use mongodb::bson::{doc, to_bson};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::auth::{current_user, require_role};
use crate::error::ApiError;
use crate::models::{ProjectEvaluation, UserRole};

/// Fully-typed marks payload; validated before any write rather than
/// patched in as a loose partial object.
#[derive(Debug, Deserialize)]
pub struct EvaluationMarks {
    pub review1_marks: f64,
    pub review2_marks: f64,
    pub review3_marks: f64,
    pub final_marks: f64,
    pub feedback: String,
}

impl EvaluationMarks {
    pub fn validate(&self) -> Result<(), ApiError> {
        let marks = [
            self.review1_marks,
            self.review2_marks,
            self.review3_marks,
            self.final_marks,
        ];
        if marks.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(ApiError::Validation(
                "marks must be non-negative numbers".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sum of the four review components. The "out of 100" bound is a UI
/// label only and is deliberately not enforced here.
pub fn compute_total(marks: &EvaluationMarks) -> f64 {
    marks.review1_marks + marks.review2_marks + marks.review3_marks + marks.final_marks
}

/// PUT /projects/{project_id}/evaluation
pub async fn update_evaluation(
    req: HttpRequest,
    data: web::Data<AppState>,
    project_id: web::Path<String>,
    payload: web::Json<EvaluationMarks>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Teacher).await?;
    payload.validate()?;

    let evaluation = ProjectEvaluation {
        review1_marks: payload.review1_marks,
        review2_marks: payload.review2_marks,
        review3_marks: payload.review3_marks,
        final_marks: payload.final_marks,
        total_score: compute_total(&payload),
        feedback: payload.feedback.clone(),
        updated_at: Utc::now(),
    };

    let result = data
        .mongodb
        .projects()
        .update_one(
            doc! { "project_id": &*project_id },
            doc! { "$set": {
                "evaluation": to_bson(&evaluation)?,
                "updated_at": to_bson(&Utc::now())?,
            } },
        )
        .await?;
    if result.matched_count == 0 {
        return Err(ApiError::NotFound("project"));
    }

    info!(
        "Evaluation for project {} updated by {} (total {})",
        project_id, actor, evaluation.total_score
    );
    Ok(HttpResponse::Ok().json(evaluation))
}

// GET /projects/{project_id}/evaluation
pub async fn get_evaluation(
    data: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let project = data
        .mongodb
        .projects()
        .find_one(doc! { "project_id": &*project_id })
        .await?
        .ok_or(ApiError::NotFound("project"))?;
    Ok(HttpResponse::Ok().json(project.evaluation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marks(r1: f64, r2: f64, r3: f64, f: f64) -> EvaluationMarks {
        EvaluationMarks {
            review1_marks: r1,
            review2_marks: r2,
            review3_marks: r3,
            final_marks: f,
            feedback: String::new(),
        }
    }

    #[test]
    fn total_is_sum_of_components() {
        assert_eq!(compute_total(&marks(20.0, 25.0, 25.0, 30.0)), 100.0);
        assert_eq!(compute_total(&marks(0.0, 0.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn total_is_not_clamped() {
        assert_eq!(compute_total(&marks(50.0, 50.0, 50.0, 50.0)), 200.0);
    }

    #[test]
    fn negative_marks_fail_validation() {
        assert!(marks(-1.0, 0.0, 0.0, 0.0).validate().is_err());
        assert!(marks(20.0, 25.0, 25.0, 30.0).validate().is_ok());
    }
}
