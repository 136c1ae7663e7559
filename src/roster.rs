// src/roster.rs
//
// Team roster mutations. The membership rules live in pure functions over
// an in-memory Team; handlers fetch the document, apply the rule, persist
// the team and then fan out notifications. The membership write always
// completes before the notification is attempted, and a failed
// notification never rolls the membership back.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, info};
use mongodb::bson::{doc, to_bson};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::{current_user, require_role};
use crate::error::ApiError;
use crate::models::{NotificationKind, Team, UserRole};
use crate::notification::notify_user_best_effort;

/// Appends a student to the roster, enforcing the capacity bound.
/// Duplicates are not checked: adding the same id twice duplicates the
/// entry (kept as-is, the roster page filters already-enrolled students).
pub fn add_member(team: &mut Team, student_id: &str) -> Result<(), ApiError> {
    if let Some(limit) = team.max_members {
        if team.member_ids.len() >= limit as usize {
            return Err(ApiError::CapacityExceeded {
                limit: limit as usize,
            });
        }
    }
    team.member_ids.push(student_id.to_string());
    Ok(())
}

/// Removes a student from the roster. If the removed student was leader,
/// leadership is cleared rather than transferred.
pub fn remove_member(team: &mut Team, student_id: &str) -> Result<(), ApiError> {
    if !team.member_ids.iter().any(|id| id == student_id) {
        return Err(ApiError::NotFound("team member"));
    }
    team.member_ids.retain(|id| id != student_id);
    if team.leader_id == student_id {
        team.leader_id.clear();
    }
    Ok(())
}

/// Toggle semantics: setting the current leader again clears leadership;
/// any other member replaces the leader unconditionally. Non-members are
/// rejected before anything is written.
pub fn set_leader(team: &mut Team, student_id: &str) -> Result<(), ApiError> {
    if team.leader_id == student_id {
        team.leader_id.clear();
        return Ok(());
    }
    if !team.member_ids.iter().any(|id| id == student_id) {
        return Err(ApiError::Validation(format!(
            "student {} is not a member of the team",
            student_id
        )));
    }
    team.leader_id = student_id.to_string();
    Ok(())
}

/// Fisher-Yates shuffle of the pool, then contiguous chunks of
/// `group_size`: ceil(n/k) groups covering every student exactly once,
/// only the final group possibly short.
pub fn auto_partition<R: Rng + ?Sized>(
    students: &[String],
    group_size: usize,
    rng: &mut R,
) -> Result<Vec<Vec<String>>, ApiError> {
    if group_size == 0 {
        return Err(ApiError::Validation(
            "group size must be at least 1".to_string(),
        ));
    }
    let mut pool = students.to_vec();
    pool.shuffle(rng);
    Ok(pool.chunks(group_size).map(|chunk| chunk.to_vec()).collect())
}

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub project_id: String,
    pub name: String,
    pub max_members: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AddMembersRequest {
    pub student_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetLeaderRequest {
    pub student_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub max_members: Option<u32>,
}

/// POST /teams
/// Creates an empty team and links it to its project.
pub async fn create_team(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<CreateTeamRequest>,
) -> Result<HttpResponse, ApiError> {
    debug!("create_team called with payload: {:?}", payload);
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Teacher).await?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("team name is required".to_string()));
    }
    let projects = data.mongodb.projects();
    if projects
        .find_one(doc! { "project_id": &payload.project_id })
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("project"));
    }

    let new_team = Team {
        team_id: Uuid::new_v4().to_string(),
        name: payload.name.clone(),
        project_id: payload.project_id.clone(),
        member_ids: Vec::new(),
        leader_id: String::new(),
        max_members: payload.max_members,
        created_at: Utc::now(),
    };
    data.mongodb.teams().insert_one(&new_team).await?;

    projects
        .update_one(
            doc! { "project_id": &payload.project_id },
            doc! { "$set": { "team_id": &new_team.team_id, "updated_at": to_bson(&Utc::now())? } },
        )
        .await?;

    info!("Team {} created for project {}", new_team.team_id, payload.project_id);
    Ok(HttpResponse::Ok().json(new_team))
}

// GET /teams/{team_id}
pub async fn get_team(
    data: web::Data<AppState>,
    team_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let team = data
        .mongodb
        .teams()
        .find_one(doc! { "team_id": &*team_id })
        .await?
        .ok_or(ApiError::NotFound("team"))?;
    Ok(HttpResponse::Ok().json(team))
}

// PUT /teams/{team_id}
pub async fn update_team(
    req: HttpRequest,
    data: web::Data<AppState>,
    team_id: web::Path<String>,
    payload: web::Json<UpdateTeamRequest>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Teacher).await?;

    let mut set_doc = doc! {};
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("team name is required".to_string()));
        }
        set_doc.insert("name", name.clone());
    }
    if let Some(size) = payload.max_members {
        set_doc.insert("max_members", size);
    }
    if set_doc.is_empty() {
        return Err(ApiError::Validation("no fields to update".to_string()));
    }

    let result = data
        .mongodb
        .teams()
        .update_one(doc! { "team_id": &*team_id }, doc! { "$set": set_doc })
        .await?;
    if result.matched_count == 0 {
        return Err(ApiError::NotFound("team"));
    }
    Ok(HttpResponse::Ok().body("Team updated"))
}

/// POST /teams/{team_id}/members
/// Adds one or more students. Each student is a separate
/// write-then-notify step; a capacity rejection mid-batch leaves the
/// students added so far in place (no atomicity across documents).
pub async fn add_team_members(
    req: HttpRequest,
    data: web::Data<AppState>,
    team_id: web::Path<String>,
    payload: web::Json<AddMembersRequest>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Teacher).await?;

    if payload.student_ids.is_empty() {
        return Err(ApiError::Validation("no students selected".to_string()));
    }

    let teams = data.mongodb.teams();
    let mut team = teams
        .find_one(doc! { "team_id": &*team_id })
        .await?
        .ok_or(ApiError::NotFound("team"))?;

    for student_id in &payload.student_ids {
        add_member(&mut team, student_id)?;
        teams
            .update_one(
                doc! { "team_id": &team.team_id },
                doc! { "$set": { "member_ids": to_bson(&team.member_ids)? } },
            )
            .await?;
        notify_user_best_effort(
            &data,
            student_id,
            NotificationKind::TeamAdded,
            &format!("You have been added to team {}", team.name),
            "/teams",
        )
        .await;
        info!("Student {} added to team {}", student_id, team.team_id);
    }

    Ok(HttpResponse::Ok().json(team))
}

// DELETE /teams/{team_id}/members/{student_id}
pub async fn remove_team_member(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (team_id, student_id) = path.into_inner();
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Teacher).await?;

    let teams = data.mongodb.teams();
    let mut team = teams
        .find_one(doc! { "team_id": &team_id })
        .await?
        .ok_or(ApiError::NotFound("team"))?;

    remove_member(&mut team, &student_id)?;
    teams
        .update_one(
            doc! { "team_id": &team_id },
            doc! { "$set": {
                "member_ids": to_bson(&team.member_ids)?,
                "leader_id": &team.leader_id,
            } },
        )
        .await?;

    notify_user_best_effort(
        &data,
        &student_id,
        NotificationKind::TeamRemoved,
        &format!("You have been removed from team {}", team.name),
        "/teams",
    )
    .await;

    info!("Student {} removed from team {}", student_id, team_id);
    Ok(HttpResponse::Ok().json(team))
}

// PUT /teams/{team_id}/leader
pub async fn set_team_leader(
    req: HttpRequest,
    data: web::Data<AppState>,
    team_id: web::Path<String>,
    payload: web::Json<SetLeaderRequest>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&req)?;
    require_role(&data, &actor, UserRole::Teacher).await?;

    let teams = data.mongodb.teams();
    let mut team = teams
        .find_one(doc! { "team_id": &*team_id })
        .await?
        .ok_or(ApiError::NotFound("team"))?;

    set_leader(&mut team, &payload.student_id)?;
    teams
        .update_one(
            doc! { "team_id": &team.team_id },
            doc! { "$set": { "leader_id": &team.leader_id } },
        )
        .await?;
    Ok(HttpResponse::Ok().json(team))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn team_with_limit(limit: Option<u32>) -> Team {
        Team {
            team_id: "t1".to_string(),
            name: "Alpha".to_string(),
            project_id: "p1".to_string(),
            member_ids: Vec::new(),
            leader_id: String::new(),
            max_members: limit,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn add_member_enforces_capacity() {
        let mut team = team_with_limit(Some(3));
        assert!(add_member(&mut team, "s1").is_ok());
        assert!(add_member(&mut team, "s2").is_ok());
        assert!(add_member(&mut team, "s3").is_ok());
        assert_eq!(team.member_ids, vec!["s1", "s2", "s3"]);

        let err = add_member(&mut team, "s4").unwrap_err();
        assert!(matches!(err, ApiError::CapacityExceeded { limit: 3 }));
        // Rejected call leaves the roster unchanged.
        assert_eq!(team.member_ids, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn add_member_without_limit_is_unbounded() {
        let mut team = team_with_limit(None);
        for i in 0..50 {
            assert!(add_member(&mut team, &format!("s{}", i)).is_ok());
        }
        assert_eq!(team.member_ids.len(), 50);
    }

    #[test]
    fn remove_member_clears_leadership() {
        let mut team = team_with_limit(None);
        add_member(&mut team, "s1").unwrap();
        add_member(&mut team, "s2").unwrap();
        set_leader(&mut team, "s1").unwrap();

        remove_member(&mut team, "s1").unwrap();
        assert_eq!(team.member_ids, vec!["s2"]);
        assert_eq!(team.leader_id, "");
    }

    #[test]
    fn remove_member_keeps_other_leader() {
        let mut team = team_with_limit(None);
        add_member(&mut team, "s1").unwrap();
        add_member(&mut team, "s2").unwrap();
        set_leader(&mut team, "s2").unwrap();

        remove_member(&mut team, "s1").unwrap();
        assert_eq!(team.leader_id, "s2");
    }

    #[test]
    fn remove_absent_member_is_not_found() {
        let mut team = team_with_limit(None);
        add_member(&mut team, "s1").unwrap();
        assert!(matches!(
            remove_member(&mut team, "nope"),
            Err(ApiError::NotFound("team member"))
        ));
        assert_eq!(team.member_ids, vec!["s1"]);
    }

    #[test]
    fn set_leader_toggles_over_two_calls() {
        let mut team = team_with_limit(None);
        add_member(&mut team, "s1").unwrap();

        set_leader(&mut team, "s1").unwrap();
        assert_eq!(team.leader_id, "s1");
        set_leader(&mut team, "s1").unwrap();
        assert_eq!(team.leader_id, "");
    }

    #[test]
    fn set_leader_replaces_unconditionally() {
        let mut team = team_with_limit(None);
        add_member(&mut team, "s1").unwrap();
        add_member(&mut team, "s2").unwrap();

        set_leader(&mut team, "s1").unwrap();
        set_leader(&mut team, "s2").unwrap();
        assert_eq!(team.leader_id, "s2");
    }

    #[test]
    fn set_leader_rejects_non_member() {
        let mut team = team_with_limit(None);
        add_member(&mut team, "s1").unwrap();
        assert!(matches!(
            set_leader(&mut team, "outsider"),
            Err(ApiError::Validation(_))
        ));
        assert_eq!(team.leader_id, "");
    }

    #[test]
    fn auto_partition_covers_pool_exactly_once() {
        let students: Vec<String> = (0..10).map(|i| format!("s{}", i)).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let groups = auto_partition(&students, 4, &mut rng).unwrap();

        assert_eq!(groups.len(), 3);
        let mut sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 4, 4]);

        let union: HashSet<&String> = groups.iter().flatten().collect();
        assert_eq!(union.len(), 10);
        assert_eq!(groups.iter().map(|g| g.len()).sum::<usize>(), 10);
        for s in &students {
            assert!(union.contains(s));
        }
    }

    #[test]
    fn auto_partition_exact_multiple() {
        let students: Vec<String> = (0..8).map(|i| format!("s{}", i)).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let groups = auto_partition(&students, 4, &mut rng).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.len() == 4));
    }

    #[test]
    fn auto_partition_empty_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let groups = auto_partition(&[], 4, &mut rng).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn auto_partition_rejects_zero_group_size() {
        let students = vec!["s1".to_string()];
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            auto_partition(&students, 0, &mut rng),
            Err(ApiError::Validation(_))
        ));
    }
}
