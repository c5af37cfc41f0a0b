// src/repo.rs
//
// Persistence adapter for the Task aggregate plus the ownership-guarded
// loaders every handler routes through. No business logic lives here beyond
// the owner check itself.

use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Collection;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::task::Task;

pub fn tasks_coll(state: &AppState) -> Collection<Task> {
    state.mongodb.db.collection::<Task>("tasks")
}

pub async fn find_task(state: &AppState, task_id: &str) -> Result<Option<Task>, ApiError> {
    let task = tasks_coll(state).find_one(doc! { "taskId": task_id }).await?;
    Ok(task)
}

/// Loads a task for an owner-only operation, collapsing "does not exist" and
/// "exists but not yours" into the same NotFound so existence is never
/// revealed to non-owners.
pub async fn find_owned_task(
    state: &AppState,
    task_id: &str,
    user_id: &str,
) -> Result<Task, ApiError> {
    match find_task(state, task_id).await? {
        Some(task) if task.is_owned_by(user_id) => Ok(task),
        _ => Err(ApiError::NotFound("Task not found".to_string())),
    }
}

pub async fn insert_task(state: &AppState, task: &Task) -> Result<(), ApiError> {
    tasks_coll(state).insert_one(task).await?;
    Ok(())
}

/// Persists an in-memory mutation by replacing the whole document, bumping
/// `updatedAt` in the process.
pub async fn save_task(state: &AppState, task: &mut Task) -> Result<(), ApiError> {
    task.updated_at = Utc::now();
    let res = tasks_coll(state)
        .replace_one(doc! { "taskId": &task.task_id }, &*task)
        .await?;
    if res.matched_count == 0 {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }
    Ok(())
}

pub async fn delete_task(state: &AppState, task_id: &str) -> Result<(), ApiError> {
    let res = tasks_coll(state)
        .delete_one(doc! { "taskId": task_id })
        .await?;
    if res.deleted_count == 0 {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }
    Ok(())
}

/// Runs a filtered, optionally sorted query and collects the cursor.
pub async fn find_tasks(
    state: &AppState,
    filter: Document,
    sort: Option<Document>,
) -> Result<Vec<Task>, ApiError> {
    let coll = tasks_coll(state);
    let mut find = coll.find(filter);
    if let Some(sort) = sort {
        find = find.sort(sort);
    }
    let tasks = find.await?.try_collect().await?;
    Ok(tasks)
}

/// Every task owned by `user_id`, unordered.
pub async fn find_user_tasks(state: &AppState, user_id: &str) -> Result<Vec<Task>, ApiError> {
    find_tasks(state, doc! { "user": user_id }, None).await
}
