// src/share.rs

use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;

use crate::app_state::AppState;
use crate::auth::{current_user, is_valid_email};
use crate::error::ApiError;
use crate::mailer::send_task_share_email;
use crate::models::task::Permission;
use crate::repo;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareTaskRequest {
    pub collaborator_email: String,
    /// Defaults to read, matching the collaborator schema default.
    pub permissions: Option<Permission>,
}

/// POST /tasks/{id}/share
///
/// This operation reveals existence: a task owned by someone else answers
/// Forbidden, not NotFound. A duplicate email is a Conflict and leaves the
/// collaborator set untouched, with no notification sent.
pub async fn share_task(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ShareTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = current_user(&req)?;
    let permissions = payload.permissions.unwrap_or(Permission::Read);

    let mut task = repo::find_task(&data, &path)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    if !task.is_owned_by(&user_id) {
        return Err(ApiError::Forbidden(
            "You are not authorized to share this task".to_string(),
        ));
    }

    // Checked only after the load/ownership checks so a bad email never
    // changes the NotFound/Forbidden answer for the task itself.
    if !is_valid_email(&payload.collaborator_email) {
        return Err(ApiError::Validation(
            "A valid collaborator email is required".to_string(),
        ));
    }

    task.try_add_collaborator(payload.collaborator_email.clone(), permissions)?;
    repo::save_task(&data, &mut task).await?;

    // Awaited before responding: a delivery failure fails the request even
    // though the collaborator is already persisted.
    send_task_share_email(&data.config, &payload.collaborator_email, &task, permissions).await?;

    info!(
        "Task {} shared with {} ({})",
        task.task_id,
        payload.collaborator_email,
        permissions.as_str()
    );
    Ok(HttpResponse::Ok().json(json!({
        "message": "Task shared successfully",
        "task": task,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_body_parses_permission_levels() {
        let body: ShareTaskRequest =
            serde_json::from_str(r#"{ "collaboratorEmail": "c@x.com", "permissions": "edit" }"#)
                .unwrap();
        assert_eq!(body.collaborator_email, "c@x.com");
        assert_eq!(body.permissions, Some(Permission::Edit));
    }

    #[test]
    fn share_body_permission_defaults_via_none() {
        let body: ShareTaskRequest =
            serde_json::from_str(r#"{ "collaboratorEmail": "c@x.com" }"#).unwrap();
        assert!(body.permissions.is_none());
        assert_eq!(body.permissions.unwrap_or(Permission::Read), Permission::Read);
    }

    #[test]
    fn share_body_rejects_unknown_permissions() {
        assert!(serde_json::from_str::<ShareTaskRequest>(
            r#"{ "collaboratorEmail": "c@x.com", "permissions": "admin" }"#
        )
        .is_err());
    }
}
