// src/models/task.rs

use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// The Task aggregate. Stored whole-document in the `tasks` collection and
/// served to clients as-is, so field names are camelCase on both sides.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub task_id: String,

    /// The owning user's id. Never changes after creation; every
    /// authorization decision compares against this field.
    pub user: String,

    pub title: String,
    pub description: String,

    pub status: TaskStatus,
    pub priority: Priority,

    pub due_date: DateTime<Utc>,

    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    /// Free-text labels, duplicates allowed.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Opaque file references; stored but otherwise uninterpreted.
    #[serde(default)]
    pub attachments: Vec<String>,

    #[serde(default)]
    pub is_recurring: bool,
    /// Only meaningful while `is_recurring` is true. Never cleared once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_interval: Option<RecurrenceInterval>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A subtask embedded in its parent Task. No identity outside the parent.
#[derive(Debug, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub status: SubtaskStatus,
}

/// An email-addressed party the task was shared with. Permissions are
/// recorded only; they are not enforced as a second access path.
#[derive(Debug, Serialize, Deserialize)]
pub struct Collaborator {
    pub email: String,
    pub permissions: Permission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtaskStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Edit,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Edit => "edit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceInterval {
    Daily,
    Weekly,
    Monthly,
}

/// Due dates are compared at calendar-date granularity: the time-of-day is
/// stripped from both sides, so "today" is always a valid due date.
pub fn due_date_is_valid(due_date: DateTime<Utc>, today: NaiveDate) -> bool {
    due_date.date_naive() >= today
}

impl Task {
    pub fn new(user: String, title: String, description: String, due_date: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Task {
            id: None,
            task_id: Uuid::new_v4().to_string(),
            user,
            title,
            description,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            due_date,
            subtasks: vec![],
            collaborators: vec![],
            tags: vec![],
            attachments: vec![],
            is_recurring: false,
            recurrence_interval: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The single ownership rule every mutation routes through.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user == user_id
    }

    /// Appends a subtask, defaulting status to pending. Titles are not
    /// checked for duplication.
    pub fn add_subtask(&mut self, title: String, status: Option<SubtaskStatus>) {
        self.subtasks.push(Subtask {
            id: Uuid::new_v4().to_string(),
            title,
            status: status.unwrap_or(SubtaskStatus::Pending),
        });
    }

    /// Removes the subtask with the given id. Returns false when no such
    /// subtask exists.
    pub fn remove_subtask(&mut self, subtask_id: &str) -> bool {
        match self.subtasks.iter().position(|s| s.id == subtask_id) {
            Some(idx) => {
                self.subtasks.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Overwrites a subtask's status. Returns false when no such subtask
    /// exists.
    pub fn set_subtask_status(&mut self, subtask_id: &str, status: SubtaskStatus) -> bool {
        match self.subtasks.iter_mut().find(|s| s.id == subtask_id) {
            Some(subtask) => {
                subtask.status = status;
                true
            }
            None => false,
        }
    }

    /// Appends a collaborator. A duplicate email is a Conflict and leaves
    /// the collaborator set untouched.
    pub fn try_add_collaborator(
        &mut self,
        email: String,
        permissions: Permission,
    ) -> Result<(), ApiError> {
        if self.collaborators.iter().any(|c| c.email == email) {
            return Err(ApiError::Conflict("Collaborator already added".to_string()));
        }
        self.collaborators.push(Collaborator { email, permissions });
        Ok(())
    }

    pub fn set_recurrence(&mut self, interval: RecurrenceInterval) {
        self.is_recurring = true;
        self.recurrence_interval = Some(interval);
    }

    /// Appends unconditionally; duplicate tags are permitted.
    pub fn add_tag(&mut self, tag: String) {
        self.tags.push(tag);
    }

    /// Removes every occurrence of `tag`. A tag that is not present is a
    /// no-op, not an error.
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_task() -> Task {
        Task::new(
            "user-1".to_string(),
            "Report".to_string(),
            "Q1".to_string(),
            Utc::now() + Duration::days(7),
        )
    }

    #[test]
    fn new_task_has_defaults() {
        let task = sample_task();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.is_recurring);
        assert!(task.recurrence_interval.is_none());
        assert!(task.subtasks.is_empty());
        assert!(task.collaborators.is_empty());
        assert!(task.tags.is_empty());
    }

    #[test]
    fn ownership_keys_on_creating_user() {
        let task = sample_task();
        assert!(task.is_owned_by("user-1"));
        assert!(!task.is_owned_by("user-2"));
    }

    #[test]
    fn due_date_today_is_valid() {
        let today = Utc::now().date_naive();
        assert!(due_date_is_valid(Utc::now(), today));
    }

    #[test]
    fn due_date_in_the_past_is_invalid() {
        let today = Utc::now().date_naive();
        assert!(!due_date_is_valid(Utc::now() - Duration::days(1), today));
        assert!(due_date_is_valid(Utc::now() + Duration::days(1), today));
    }

    #[test]
    fn add_subtask_defaults_to_pending() {
        let mut task = sample_task();
        task.add_subtask("Draft outline".to_string(), None);
        assert_eq!(task.subtasks.len(), 1);
        assert_eq!(task.subtasks[0].status, SubtaskStatus::Pending);
        assert_eq!(task.subtasks[0].title, "Draft outline");
    }

    #[test]
    fn subtasks_keep_insertion_order() {
        let mut task = sample_task();
        task.add_subtask("first".to_string(), None);
        task.add_subtask("second".to_string(), Some(SubtaskStatus::Completed));
        task.add_subtask("third".to_string(), None);
        let middle_id = task.subtasks[1].id.clone();
        assert!(task.remove_subtask(&middle_id));
        assert_eq!(task.subtasks[0].title, "first");
        assert_eq!(task.subtasks[1].title, "third");
    }

    #[test]
    fn remove_missing_subtask_reports_false() {
        let mut task = sample_task();
        task.add_subtask("only".to_string(), None);
        assert!(!task.remove_subtask("no-such-id"));
        assert_eq!(task.subtasks.len(), 1);
    }

    #[test]
    fn set_subtask_status_overwrites() {
        let mut task = sample_task();
        task.add_subtask("Draft outline".to_string(), None);
        let id = task.subtasks[0].id.clone();
        assert!(task.set_subtask_status(&id, SubtaskStatus::Completed));
        assert_eq!(task.subtasks[0].status, SubtaskStatus::Completed);
        assert!(!task.set_subtask_status("no-such-id", SubtaskStatus::Pending));
    }

    #[test]
    fn collaborators_are_unique_by_email() {
        let mut task = sample_task();
        assert!(task
            .try_add_collaborator("c@x.com".to_string(), Permission::Edit)
            .is_ok());
        assert!(task
            .try_add_collaborator("other@x.com".to_string(), Permission::Read)
            .is_ok());
        assert_eq!(task.collaborators.len(), 2);
    }

    #[test]
    fn duplicate_collaborator_is_a_conflict_and_leaves_the_set_unchanged() {
        let mut task = sample_task();
        task.try_add_collaborator("c@x.com".to_string(), Permission::Edit)
            .unwrap();

        let err = task
            .try_add_collaborator("c@x.com".to_string(), Permission::Read)
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(task.collaborators.len(), 1);
        assert_eq!(task.collaborators[0].permissions, Permission::Edit);
    }

    #[test]
    fn set_recurrence_flags_and_records_interval() {
        let mut task = sample_task();
        task.set_recurrence(RecurrenceInterval::Weekly);
        assert!(task.is_recurring);
        assert_eq!(task.recurrence_interval, Some(RecurrenceInterval::Weekly));
    }

    #[test]
    fn duplicate_tags_are_allowed() {
        let mut task = sample_task();
        task.add_tag("urgent".to_string());
        task.add_tag("urgent".to_string());
        assert_eq!(task.tags, vec!["urgent", "urgent"]);
    }

    #[test]
    fn remove_tag_drops_all_occurrences() {
        let mut task = sample_task();
        task.add_tag("urgent".to_string());
        task.add_tag("home".to_string());
        task.add_tag("urgent".to_string());
        task.remove_tag("urgent");
        assert_eq!(task.tags, vec!["home"]);
    }

    #[test]
    fn remove_absent_tag_is_a_no_op() {
        let mut task = sample_task();
        task.add_tag("home".to_string());
        task.remove_tag("urgent");
        assert_eq!(task.tags, vec!["home"]);
    }

    #[test]
    fn status_serializes_with_hyphenated_in_progress() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let back: TaskStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(back, TaskStatus::InProgress);
    }
}
