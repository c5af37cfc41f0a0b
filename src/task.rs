// src/task.rs

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use log::info;
use serde::Deserialize;
use serde_json::json;

use crate::app_state::AppState;
use crate::auth::current_user;
use crate::error::ApiError;
use crate::models::task::{
    due_date_is_valid, Priority, RecurrenceInterval, Task, TaskStatus,
};
use crate::query::{build_filter, build_sort, TaskListQuery};
use crate::repo;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
}

/// Field allow-list for PATCH. Any key outside this set rejects the whole
/// request before it reaches the aggregate; values are not re-validated
/// against the creation rules (a past dueDate is accepted here).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Deserialize)]
pub struct RecurrenceRequest {
    pub recurrence: Option<RecurrenceInterval>,
}

/// POST /tasks
pub async fn create_task(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;

    if payload.title.trim().is_empty() || payload.description.trim().is_empty() {
        return Err(ApiError::Validation("All fields are required".to_string()));
    }
    if !due_date_is_valid(payload.due_date, Utc::now().date_naive()) {
        return Err(ApiError::Validation(
            "Please select a valid future date.".to_string(),
        ));
    }

    let task = Task::new(
        user_id,
        payload.title.clone(),
        payload.description.clone(),
        payload.due_date,
    );
    repo::insert_task(&data, &task).await?;

    info!("Task created: {}", task.task_id);
    Ok(HttpResponse::Created().json(task))
}

/// GET /tasks?status&priority&tags&collaborator&sortBy
pub async fn list_tasks(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<TaskListQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;

    let filter = build_filter(&user_id, &query);
    let sort = build_sort(query.sort_by.as_deref());
    let tasks = repo::find_tasks(&data, filter, Some(sort)).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// GET /tasks/{id}
pub async fn get_task(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;
    let task = repo::find_owned_task(&data, &path, &user_id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// PATCH /tasks/{id}
pub async fn update_task(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;
    let mut task = repo::find_owned_task(&data, &path, &user_id).await?;

    let payload = payload.into_inner();
    if let Some(title) = payload.title {
        task.title = title;
    }
    if let Some(description) = payload.description {
        task.description = description;
    }
    if let Some(due_date) = payload.due_date {
        task.due_date = due_date;
    }
    if let Some(status) = payload.status {
        task.status = status;
    }
    if let Some(priority) = payload.priority {
        task.priority = priority;
    }

    repo::save_task(&data, &mut task).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;
    let task = repo::find_owned_task(&data, &path, &user_id).await?;

    repo::delete_task(&data, &task.task_id).await?;
    info!("Task deleted: {}", task.task_id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}

/// POST /tasks/{id}/recurring
///
/// This operation reveals existence: a task owned by someone else answers
/// Forbidden, not NotFound.
pub async fn set_recurring_task(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<RecurrenceRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;

    let interval = payload
        .recurrence
        .ok_or_else(|| ApiError::Validation("Recurrence is required".to_string()))?;

    let mut task = repo::find_task(&data, &path)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    if !task.is_owned_by(&user_id) {
        return Err(ApiError::Forbidden(
            "You are not authorized to set recurrence for this task".to_string(),
        ));
    }

    task.set_recurrence(interval);
    repo::save_task(&data, &mut task).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task recurrence set successfully",
        "task": task,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_rejects_fields_outside_the_allow_list() {
        let err = serde_json::from_str::<UpdateTaskRequest>(
            r#"{ "title": "ok", "owner": "someone-else" }"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn update_accepts_any_allow_listed_subset() {
        let patch: UpdateTaskRequest =
            serde_json::from_str(r#"{ "status": "completed", "priority": "high" }"#).unwrap();
        assert_eq!(patch.status, Some(TaskStatus::Completed));
        assert_eq!(patch.priority, Some(Priority::High));
        assert!(patch.title.is_none());

        let empty: UpdateTaskRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.due_date.is_none());
    }

    #[test]
    fn update_rejects_unknown_enum_values() {
        assert!(serde_json::from_str::<UpdateTaskRequest>(r#"{ "status": "done" }"#).is_err());
        assert!(serde_json::from_str::<UpdateTaskRequest>(r#"{ "priority": "urgent" }"#).is_err());
    }

    #[test]
    fn recurrence_body_parses_known_intervals_only() {
        let body: RecurrenceRequest = serde_json::from_str(r#"{ "recurrence": "weekly" }"#).unwrap();
        assert_eq!(body.recurrence, Some(RecurrenceInterval::Weekly));
        assert!(serde_json::from_str::<RecurrenceRequest>(r#"{ "recurrence": "yearly" }"#).is_err());
        let missing: RecurrenceRequest = serde_json::from_str("{}").unwrap();
        assert!(missing.recurrence.is_none());
    }
}
