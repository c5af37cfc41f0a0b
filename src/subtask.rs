// src/subtask.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::app_state::AppState;
use crate::auth::current_user;
use crate::error::ApiError;
use crate::models::task::SubtaskStatus;
use crate::repo;

#[derive(Debug, Deserialize)]
pub struct AddSubtaskRequest {
    pub title: String,
    pub status: Option<SubtaskStatus>,
}

#[derive(Debug, Deserialize)]
pub struct SubtaskStatusRequest {
    pub status: Option<SubtaskStatus>,
}

/// POST /tasks/{id}/subtasks
pub async fn add_subtask(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<AddSubtaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Subtask title is required".to_string()));
    }

    let mut task = repo::find_owned_task(&data, &path, &user_id).await?;
    task.add_subtask(payload.title.clone(), payload.status);
    repo::save_task(&data, &mut task).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Subtask added successfully",
        "task": task,
    })))
}

/// DELETE /tasks/{task_id}/subtasks/{subtask_id}
pub async fn delete_subtask(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;
    let (task_id, subtask_id) = path.into_inner();

    let mut task = repo::find_owned_task(&data, &task_id, &user_id).await?;
    if !task.remove_subtask(&subtask_id) {
        return Err(ApiError::NotFound("Subtask not found".to_string()));
    }
    repo::save_task(&data, &mut task).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Subtask deleted successfully",
        "task": task,
    })))
}

/// PUT /tasks/{task_id}/subtasks/{subtask_id}
pub async fn update_subtask_status(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
    payload: web::Json<SubtaskStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;
    let (task_id, subtask_id) = path.into_inner();

    let status = payload
        .status
        .ok_or_else(|| ApiError::Validation("Status is required".to_string()))?;

    let mut task = repo::find_owned_task(&data, &task_id, &user_id).await?;
    if !task.set_subtask_status(&subtask_id, status) {
        return Err(ApiError::NotFound("Subtask not found".to_string()));
    }
    repo::save_task(&data, &mut task).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Subtask status updated successfully",
        "task": task,
    })))
}
