// src/main.rs

mod app_state;
mod auth;
mod config;
mod db;
mod error;
mod export;
mod mailer;
mod metrics;
mod models;
mod query;
mod repo;
mod share;
mod subtask;
mod tags;
mod task;

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
use futures::future::{ok, Ready};

use crate::app_state::AppState;
use crate::auth::{login, signup, validate_jwt};
use crate::export::export_tasks;
use crate::metrics::get_task_metrics;
use crate::share::share_task;
use crate::subtask::{add_subtask, delete_subtask, update_subtask_status};
use crate::tags::{add_tag, remove_tag};
use crate::task::{
    create_task, delete_task, get_task, list_tasks, set_recurring_task, update_task,
};

/// Decodes the bearer token and attaches the authenticated user id to the
/// request extensions. Handlers read it back through `auth::current_user`;
/// requests without a usable identity fail there with 401.
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
        if let Some(auth_header) = req.headers().get(http::header::AUTHORIZATION) {
            if let Ok(auth_str) = auth_header.to_str() {
                if let Some(token) = auth_str.strip_prefix("Bearer ") {
                    let secret =
                        env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string());
                    match validate_jwt(token.trim(), &secret) {
                        Ok(claims) => {
                            req.extensions_mut().insert(claims.sub);
                        }
                        Err(e) => {
                            let (req_parts, _payload) = req.into_parts();
                            let resp = HttpResponse::Unauthorized()
                                .json(serde_json::json!({
                                    "message": format!("Invalid token: {}", e)
                                }))
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
    let mongodb = Arc::new(db::MongoDB::init(&config.mongo_uri, &config.database_name).await);

    let frontend_origin = config.frontend_origin.clone();
    println!("Server running at http://0.0.0.0:8080");
    println!("Allowed CORS Origin: {}", frontend_origin);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                http::header::CONTENT_TYPE,
                http::header::ACCEPT,
                http::header::AUTHORIZATION,
            ])
            .supports_credentials()
            .max_age(3600);

        // Body-deserialization failures get the same {"message"} shape as
        // every other error.
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            let message = err.to_string();
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest()
                    .json(serde_json::json!({ "message": message })),
            )
            .into()
        });

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(Authentication)
            .app_data(json_config)
            .app_data(web::Data::new(AppState {
                mongodb: mongodb.clone(),
                config: config.clone(),
            }))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(signup))
                    .route("/login", web::post().to(login)),
            )
            .service(
                web::scope("/tasks")
                    .route("", web::post().to(create_task))
                    .route("", web::get().to(list_tasks))
                    .route("/{id}", web::get().to(get_task))
                    .route("/{id}", web::patch().to(update_task))
                    .route("/{id}", web::delete().to(delete_task))
                    .route("/{id}/subtasks", web::post().to(add_subtask))
                    .route(
                        "/{task_id}/subtasks/{subtask_id}",
                        web::delete().to(delete_subtask),
                    )
                    .route(
                        "/{task_id}/subtasks/{subtask_id}",
                        web::put().to(update_subtask_status),
                    )
                    .route("/{id}/share", web::post().to(share_task))
                    .route("/{id}/recurring", web::post().to(set_recurring_task))
                    .route("/{id}/export", web::get().to(export_tasks))
                    .route("/{id}/metrics", web::get().to(get_task_metrics))
                    .route("/{id}/tags", web::post().to(add_tag))
                    .route("/{id}/tags", web::delete().to(remove_tag)),
            )
    })
    .bind("0.0.0.0:8080")?
    .run()
    .await
}
