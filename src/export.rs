// src/export.rs

use actix_web::{web, HttpRequest, HttpResponse};
use log::error;

use crate::app_state::AppState;
use crate::auth::current_user;
use crate::error::ApiError;
use crate::models::task::Task;
use crate::repo;

const EXPORT_FIELDS: [&str; 5] = ["title", "description", "status", "priority", "dueDate"];

/// Renders tasks as CSV: a header row followed by one row per task over the
/// fixed field set, in order.
pub fn tasks_to_csv(tasks: &[Task]) -> Result<String, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_FIELDS).map_err(csv_error)?;
    for task in tasks {
        writer
            .write_record([
                task.title.as_str(),
                task.description.as_str(),
                task.status.as_str(),
                task.priority.as_str(),
                &task.due_date.to_rfc3339(),
            ])
            .map_err(csv_error)?;
    }
    let bytes = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}

fn csv_error(e: impl std::fmt::Display) -> ApiError {
    error!("CSV rendering failed: {}", e);
    ApiError::Dependency("Error exporting tasks".to_string())
}

/// GET /tasks/{id}/export
///
/// The path id is only part of the authenticated route shape; the export
/// always covers the requesting user's whole collection.
pub async fn export_tasks(
    req: HttpRequest,
    data: web::Data<AppState>,
    _path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;

    let tasks = repo::find_user_tasks(&data, &user_id).await?;
    if tasks.is_empty() {
        return Err(ApiError::NotFound("No tasks found to export".to_string()));
    }

    let csv = tasks_to_csv(&tasks)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"tasks.csv\"",
        ))
        .body(csv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn task(title: &str, description: &str) -> Task {
        Task::new(
            "user-1".to_string(),
            title.to_string(),
            description.to_string(),
            Utc::now() + Duration::days(3),
        )
    }

    #[test]
    fn header_only_for_empty_input() {
        let csv = tasks_to_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), "title,description,status,priority,dueDate");
    }

    #[test]
    fn one_data_row_per_task_in_field_order() {
        let tasks = vec![task("Report", "Q1"), task("Review", "Q2")];
        let csv = tasks_to_csv(&tasks).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "title,description,status,priority,dueDate");
        assert!(lines[1].starts_with("Report,Q1,pending,medium,"));
        assert!(lines[2].starts_with("Review,Q2,pending,medium,"));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let tasks = vec![task("Report", "Q1, all regions")];
        let csv = tasks_to_csv(&tasks).unwrap();
        assert!(csv.contains("Report,\"Q1, all regions\",pending,medium,"));
    }
}
