// src/query.rs
//
// Builds the Mongo filter and sort documents for the task list endpoint from
// independently optional query parameters. Parameters that are not supplied
// impose no constraint.

use mongodb::bson::{doc, Document};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Comma-separated list; a task matches if any of its tags is in the set.
    pub tags: Option<String>,
    /// Case-insensitive substring match against collaborator emails.
    pub collaborator: Option<String>,
    /// `field:direction`; any direction token other than `desc` sorts
    /// ascending.
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

pub fn build_filter(user_id: &str, query: &TaskListQuery) -> Document {
    let mut filter = doc! { "user": user_id };
    if let Some(status) = &query.status {
        filter.insert("status", status);
    }
    if let Some(priority) = &query.priority {
        filter.insert("priority", priority);
    }
    if let Some(tags) = &query.tags {
        let tags: Vec<&str> = tags.split(',').collect();
        filter.insert("tags", doc! { "$in": tags });
    }
    if let Some(collaborator) = &query.collaborator {
        filter.insert(
            "collaborators.email",
            doc! { "$regex": collaborator, "$options": "i" },
        );
    }
    filter
}

/// Sort fields are not validated against the schema; sorting on a field no
/// document carries leaves Mongo's missing-field ordering as the
/// deterministic fallback. Default is newest-created first.
pub fn build_sort(sort_by: Option<&str>) -> Document {
    match sort_by {
        Some(sort_by) => {
            let (field, direction) = match sort_by.split_once(':') {
                Some((field, direction)) => (field, direction),
                None => (sort_by, "asc"),
            };
            let order = if direction == "desc" { -1 } else { 1 };
            doc! { field: order }
        }
        None => doc! { "createdAt": -1 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_constrains_only_the_owner() {
        let filter = build_filter("user-1", &TaskListQuery::default());
        assert_eq!(filter, doc! { "user": "user-1" });
    }

    #[test]
    fn all_filters_combine() {
        let query = TaskListQuery {
            status: Some("pending".to_string()),
            priority: Some("high".to_string()),
            tags: Some("work,urgent".to_string()),
            collaborator: Some("x.com".to_string()),
            sort_by: None,
        };
        let filter = build_filter("user-1", &query);
        assert_eq!(
            filter,
            doc! {
                "user": "user-1",
                "status": "pending",
                "priority": "high",
                "tags": { "$in": ["work", "urgent"] },
                "collaborators.email": { "$regex": "x.com", "$options": "i" },
            }
        );
    }

    #[test]
    fn default_sort_is_created_at_descending() {
        assert_eq!(build_sort(None), doc! { "createdAt": -1 });
    }

    #[test]
    fn sort_direction_tokens() {
        assert_eq!(build_sort(Some("dueDate:asc")), doc! { "dueDate": 1 });
        assert_eq!(build_sort(Some("dueDate:desc")), doc! { "dueDate": -1 });
        // anything that is not exactly "desc" sorts ascending
        assert_eq!(build_sort(Some("dueDate:DESC")), doc! { "dueDate": 1 });
        assert_eq!(build_sort(Some("priority:garbage")), doc! { "priority": 1 });
    }

    #[test]
    fn sort_without_direction_is_ascending() {
        assert_eq!(build_sort(Some("priority")), doc! { "priority": 1 });
    }

    #[test]
    fn unknown_sort_fields_pass_through_unvalidated() {
        assert_eq!(build_sort(Some("noSuchField:desc")), doc! { "noSuchField": -1 });
    }
}
