// src/tags.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::app_state::AppState;
use crate::auth::current_user;
use crate::error::ApiError;
use crate::repo;

#[derive(Debug, Deserialize)]
pub struct AddTagRequest {
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveTagRequest {
    pub tag: String,
}

/// POST /tasks/{id}/tags
pub async fn add_tag(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<AddTagRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;

    let tag = match &payload.tag {
        Some(tag) if !tag.trim().is_empty() => tag.clone(),
        _ => return Err(ApiError::Validation("Tag is required".to_string())),
    };

    let mut task = repo::find_owned_task(&data, &path, &user_id).await?;
    task.add_tag(tag);
    repo::save_task(&data, &mut task).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Tag added successfully",
        "task": task,
    })))
}

/// DELETE /tasks/{id}/tags
///
/// Removes every occurrence of the tag; a tag that was never present is a
/// successful no-op.
pub async fn remove_tag(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<RemoveTagRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;

    let mut task = repo::find_owned_task(&data, &path, &user_id).await?;
    task.remove_tag(&payload.tag);
    repo::save_task(&data, &mut task).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Tag removed successfully",
        "task": task,
    })))
}
