// src/main.rs

mod app_state;
mod auth;
mod config;
mod error;
mod evaluation;
mod groups;
mod meeting;
mod models;
mod notification;
mod progress;
mod project;
mod research;
mod roster;
mod sprint;
mod store;
mod users;

use std::env;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_cors::Cors;
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http,
    middleware::Logger,
    web, App, Error, HttpMessage, HttpResponse, HttpServer,
};
use env_logger::Env;
use futures_util::future::{ok, Ready};

use crate::app_state::AppState;
use crate::auth::{login, signup, verify_token};
use crate::evaluation::{get_evaluation, update_evaluation};
use crate::groups::{auto_assign, create_group, delete_group, list_groups, update_group};
use crate::meeting::{
    create_comment, create_meeting, create_progress_log, list_comments, list_meetings,
    list_progress_logs, update_meeting,
};
use crate::notification::{list_notifications, mark_read, unread_count};
use crate::progress::{overview, project_analytics};
use crate::project::{
    create_project, delete_project, get_project, list_projects, update_project,
};
use crate::research::{create_ip_record, create_paper, list_ip_records, list_papers};
use crate::roster::{
    add_team_members, create_team, get_team, remove_team_member, set_team_leader, update_team,
};
use crate::sprint::{
    create_sprint, create_task, delete_task, list_project_tasks, list_sprint_tasks, list_sprints,
    update_sprint, update_task,
};
use crate::users::{
    get_team_members, get_user, get_user_teams, list_students, list_teachers, update_profile,
};

#[derive(Debug)]
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = AuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddleware { service })
    }
}

pub struct AuthMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Resolve "Bearer <token>" into the actor id; handlers read it
        // back through auth::current_user.
        if let Some(auth_header) = req.headers().get(http::header::AUTHORIZATION) {
            if let Ok(auth_str) = auth_header.to_str() {
                if auth_str.starts_with("Bearer ") {
                    let token = auth_str.trim_start_matches("Bearer ").trim();
                    let secret =
                        env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string());
                    match verify_token(token, &secret) {
                        Ok(user_id) => {
                            req.extensions_mut().insert(user_id);
                        }
                        Err(e) => {
                            let (req_parts, _payload) = req.into_parts();
                            let resp = HttpResponse::Unauthorized()
                                .body(format!("Invalid token: {}", e))
                                .map_into_boxed_body();
                            let srv_resp = ServiceResponse::new(req_parts, resp);
                            return Box::pin(async move { Ok(srv_resp) });
                        }
                    }
                }
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_boxed_body())
        })
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = config::Config::from_env();
    let mongodb = Arc::new(store::MongoDB::init(&config.mongo_uri, &config.database_name).await);

    let frontend_origin =
        env::var("FRONTEND_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

    println!("Server running at http://0.0.0.0:8080");
    println!("Allowed CORS Origin: {}", frontend_origin);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                http::header::CONTENT_TYPE,
                http::header::ACCEPT,
                http::header::AUTHORIZATION,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(Authentication)
            .app_data(web::Data::new(AppState {
                mongodb: mongodb.clone(),
                config: config.clone(),
            }))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(signup))
                    .route("/login", web::post().to(login)),
            )
            // USERS
            .service(
                web::scope("/users")
                    .route("/teachers", web::get().to(list_teachers))
                    .route("/students", web::get().to(list_students))
                    .route("/{user_id}", web::get().to(get_user))
                    .route("/{user_id}", web::put().to(update_profile))
                    .route("/{user_id}/teams", web::get().to(get_user_teams)),
            )
            // TEAMS / ROSTER
            .service(
                web::scope("/teams")
                    .route("", web::post().to(create_team))
                    .route("/{team_id}", web::get().to(get_team))
                    .route("/{team_id}", web::put().to(update_team))
                    .route("/{team_id}/members", web::get().to(get_team_members))
                    .route("/{team_id}/members", web::post().to(add_team_members))
                    .route(
                        "/{team_id}/members/{student_id}",
                        web::delete().to(remove_team_member),
                    )
                    .route("/{team_id}/leader", web::put().to(set_team_leader)),
            )
            // STUDENT GROUPS (admin cohorts)
            .service(
                web::scope("/groups")
                    .route("", web::get().to(list_groups))
                    .route("", web::post().to(create_group))
                    .route("/auto-assign", web::post().to(auto_assign))
                    .route("/{group_id}", web::put().to(update_group))
                    .route("/{group_id}", web::delete().to(delete_group)),
            )
            // PROJECTS and nested resources
            .service(
                web::scope("/projects")
                    .route("", web::get().to(list_projects))
                    .route("", web::post().to(create_project))
                    .service(
                        web::scope("/{project_id}")
                            .route("", web::get().to(get_project))
                            .route("", web::put().to(update_project))
                            .route("", web::delete().to(delete_project))
                            .route("/evaluation", web::get().to(get_evaluation))
                            .route("/evaluation", web::put().to(update_evaluation))
                            .route("/analytics", web::get().to(project_analytics))
                            .route("/sprints", web::get().to(list_sprints))
                            .route("/sprints", web::post().to(create_sprint))
                            .route("/tasks", web::get().to(list_project_tasks))
                            .route("/meetings", web::get().to(list_meetings))
                            .route("/meetings", web::post().to(create_meeting))
                            .route("/comments", web::get().to(list_comments))
                            .route("/comments", web::post().to(create_comment))
                            .route("/logs", web::get().to(list_progress_logs))
                            .route("/logs", web::post().to(create_progress_log))
                            .route("/research", web::get().to(list_papers))
                            .route("/research", web::post().to(create_paper))
                            .route("/ip", web::get().to(list_ip_records))
                            .route("/ip", web::post().to(create_ip_record)),
                    ),
            )
            // SPRINTS / TASKS
            .service(
                web::scope("/sprints").service(
                    web::scope("/{sprint_id}")
                        .route("", web::put().to(update_sprint))
                        .route("/tasks", web::get().to(list_sprint_tasks))
                        .route("/tasks", web::post().to(create_task)),
                ),
            )
            .service(
                web::scope("/tasks")
                    .route("/{task_id}", web::put().to(update_task))
                    .route("/{task_id}", web::delete().to(delete_task)),
            )
            // MEETINGS
            .service(
                web::scope("/meetings").route("/{meeting_id}", web::put().to(update_meeting)),
            )
            // NOTIFICATIONS
            .service(
                web::scope("/notifications")
                    .route("/{user_id}", web::get().to(list_notifications))
                    .route("/{user_id}/unread_count", web::get().to(unread_count))
                    .route("/{notification_id}/read", web::put().to(mark_read)),
            )
            // ANALYTICS
            .service(web::scope("/analytics").route("/overview", web::get().to(overview)))
    })
    .bind("0.0.0.0:8080")?
    .run()
    .await
}
