// src/metrics.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::app_state::AppState;
use crate::auth::current_user;
use crate::error::ApiError;
use crate::models::task::{Task, TaskStatus};
use crate::repo;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetrics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
}

pub fn compute_metrics(tasks: &[Task]) -> TaskMetrics {
    TaskMetrics {
        total: tasks.len(),
        completed: count_status(tasks, TaskStatus::Completed),
        pending: count_status(tasks, TaskStatus::Pending),
        in_progress: count_status(tasks, TaskStatus::InProgress),
    }
}

fn count_status(tasks: &[Task], status: TaskStatus) -> usize {
    tasks.iter().filter(|t| t.status == status).count()
}

/// GET /tasks/{id}/metrics
///
/// The path id is only part of the authenticated route shape; counts cover
/// the requesting user's whole collection. An empty collection is not an
/// error, all counts are zero.
pub async fn get_task_metrics(
    req: HttpRequest,
    data: web::Data<AppState>,
    _path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;
    let tasks = repo::find_user_tasks(&data, &user_id).await?;
    Ok(HttpResponse::Ok().json(compute_metrics(&tasks)))
}
