// src/notification.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures_util::TryStreamExt;
use log::{info, warn};
use mongodb::bson::doc;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::{Notification, NotificationKind, Team};

/// Builds one notification per team member with identical message and
/// link, all unread. Pure; the caller persists the batch.
pub fn fan_out(team: &Team, kind: NotificationKind, message: &str, link: &str) -> Vec<Notification> {
    team.member_ids
        .iter()
        .map(|member_id| Notification {
            notification_id: Uuid::new_v4().to_string(),
            user_id: member_id.clone(),
            kind,
            message: message.to_string(),
            link: link.to_string(),
            read: false,
            created_at: Utc::now(),
        })
        .collect()
}

pub async fn notify_user(
    data: &AppState,
    user_id: &str,
    kind: NotificationKind,
    message: &str,
    link: &str,
) -> Result<(), ApiError> {
    let notification = Notification {
        notification_id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        kind,
        message: message.to_string(),
        link: link.to_string(),
        read: false,
        created_at: Utc::now(),
    };
    data.mongodb.notifications().insert_one(&notification).await?;
    Ok(())
}

/// Writes are sequential and a mid-batch failure is not rolled back; the
/// caller sees the error of the step that failed.
pub async fn notify_team(
    data: &AppState,
    team_id: &str,
    kind: NotificationKind,
    message: &str,
    link: &str,
) -> Result<usize, ApiError> {
    let team = data
        .mongodb
        .teams()
        .find_one(doc! { "team_id": team_id })
        .await?
        .ok_or(ApiError::NotFound("team"))?;

    let batch = fan_out(&team, kind, message, link);
    let count = batch.len();
    for notification in &batch {
        data.mongodb.notifications().insert_one(notification).await?;
    }
    info!("Notified {} members of team {}", count, team_id);
    Ok(count)
}

/// Best-effort variant used after a roster write has already succeeded:
/// the membership change stands even if the notification write fails.
pub async fn notify_user_best_effort(
    data: &AppState,
    user_id: &str,
    kind: NotificationKind,
    message: &str,
    link: &str,
) {
    if let Err(e) = notify_user(data, user_id, kind, message, link).await {
        warn!("Failed to notify user {}: {}", user_id, e);
    }
}

// GET /notifications/{user_id}
pub async fn list_notifications(
    data: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let mut notifications: Vec<Notification> = data
        .mongodb
        .notifications()
        .find(doc! { "user_id": &*user_id })
        .await?
        .try_collect()
        .await?;

    // Newest first, capped at 20 for the bell dropdown.
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    notifications.truncate(20);
    Ok(HttpResponse::Ok().json(notifications))
}

// GET /notifications/{user_id}/unread_count
pub async fn unread_count(
    data: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let count = data
        .mongodb
        .notifications()
        .count_documents(doc! { "user_id": &*user_id, "read": false })
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "unread": count })))
}

// PUT /notifications/{notification_id}/read
pub async fn mark_read(
    data: web::Data<AppState>,
    notification_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let result = data
        .mongodb
        .notifications()
        .update_one(
            doc! { "notification_id": &*notification_id },
            doc! { "$set": { "read": true } },
        )
        .await?;
    if result.matched_count == 0 {
        return Err(ApiError::NotFound("notification"));
    }
    Ok(HttpResponse::Ok().body("Notification marked as read"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn team_of(members: &[&str]) -> Team {
        Team {
            team_id: "t1".to_string(),
            name: "Alpha".to_string(),
            project_id: "p1".to_string(),
            member_ids: members.iter().map(|s| s.to_string()).collect(),
            leader_id: String::new(),
            max_members: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fan_out_produces_one_record_per_member() {
        let team = team_of(&["a", "b", "c"]);
        let batch = fan_out(&team, NotificationKind::Meeting, "New meeting", "/meetings");

        assert_eq!(batch.len(), 3);
        let recipients: Vec<&str> = batch.iter().map(|n| n.user_id.as_str()).collect();
        assert_eq!(recipients, vec!["a", "b", "c"]);
        for n in &batch {
            assert!(!n.read);
            assert_eq!(n.message, "New meeting");
            assert_eq!(n.link, "/meetings");
        }
    }

    #[test]
    fn fan_out_on_empty_team_is_empty() {
        let team = team_of(&[]);
        assert!(fan_out(&team, NotificationKind::Comment, "x", "/y").is_empty());
    }
}
