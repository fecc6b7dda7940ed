//! Client-local task records.
//!
//! # Invariants
//! - `id` is derived from creation time and unique within one list.
//! - `completed` defaults to `false`.
//! - `description` is `None` rather than an empty string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task identifier: creation time in epoch milliseconds, as text.
pub type TaskId = String;

/// One task in the client-local list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    /// Free text; no length rule.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Title/description pair produced by the task form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
        }
    }

    /// Collapses blank descriptions to `None`.
    pub(crate) fn normalized_description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskDraft, TaskRecord};

    #[test]
    fn record_uses_camel_case_wire_names_and_skips_missing_description() {
        let record = TaskRecord {
            id: "1700000000000".to_string(),
            title: "ship".to_string(),
            description: None,
            completed: false,
            created_at: "2026-02-13T10:00:00Z".parse().unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "1700000000000");
        assert_eq!(json["createdAt"], "2026-02-13T10:00:00Z");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn record_tolerates_missing_completed_flag() {
        let record: TaskRecord = serde_json::from_str(
            r#"{"id":"1","title":"t","description":"","createdAt":"2026-02-13T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(!record.completed);
        assert_eq!(record.description.as_deref(), Some(""));
    }

    #[test]
    fn blank_description_normalizes_to_none() {
        assert_eq!(
            TaskDraft::new("t", Some("   ".to_string())).normalized_description(),
            None
        );
        assert_eq!(
            TaskDraft::new("t", Some(" notes ".to_string())).normalized_description(),
            Some("notes".to_string())
        );
    }
}
