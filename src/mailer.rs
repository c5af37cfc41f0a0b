// src/mailer.rs

use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use log::error;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::task::{Permission, Task};

/// Notifies a collaborator that a task was shared with them. The caller
/// awaits this before reporting success, so a delivery failure fails the
/// whole share operation.
pub async fn send_task_share_email(
    config: &Config,
    email: &str,
    task: &Task,
    permissions: Permission,
) -> Result<(), ApiError> {
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.email_host)
        .map_err(|e| delivery_error("SMTP relay setup", e))?
        .credentials(Credentials::new(
            config.email_user.clone(),
            config.email_pass.clone(),
        ))
        .build();

    let html = format!(
        "<h1>Task Shared with You</h1>\
         <p>The following task has been shared with you:</p>\
         <ul>\
           <li><strong>Title:</strong> {}</li>\
           <li><strong>Description:</strong> {}</li>\
           <li><strong>Permissions:</strong> {}</li>\
         </ul>\
         <p>You can access the task <a href=\"{}/get-task/{}\">here</a>.</p>",
        task.title,
        task.description,
        permissions.as_str(),
        config.frontend_origin,
        task.task_id,
    );

    let message = Message::builder()
        .from(
            format!("\"Task Manager\" <{}>", config.email_user)
                .parse()
                .map_err(|e| delivery_error("sender address", e))?,
        )
        .to(email.parse().map_err(|e| delivery_error("recipient address", e))?)
        .subject("You've Been Added as a Collaborator")
        .header(ContentType::TEXT_HTML)
        .body(html)
        .map_err(|e| delivery_error("message build", e))?;

    mailer
        .send(message)
        .await
        .map_err(|e| delivery_error("SMTP send", e))?;
    Ok(())
}

fn delivery_error(stage: &str, e: impl std::fmt::Display) -> ApiError {
    error!("Share notification failed at {}: {}", stage, e);
    ApiError::Dependency("Error sending share notification".to_string())
}
