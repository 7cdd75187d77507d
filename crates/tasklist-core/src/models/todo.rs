//! Todo model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a todo row, assigned by the remote store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for TodoId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A row of the `todos` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Remote-assigned identifier
    pub id: TodoId,
    /// Task text
    pub title: String,
    /// Completion flag
    #[serde(default)]
    pub is_completed: bool,
    /// Owning user
    pub user_id: String,
    /// Remote-assigned creation time, the list's sort key
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Apply the columns carried by a patch.
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(is_completed) = patch.is_completed {
            self.is_completed = is_completed;
        }
    }
}

/// Insert payload for a new row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTodo {
    pub title: String,
    pub is_completed: bool,
    pub user_id: String,
}

impl NewTodo {
    #[must_use]
    pub fn new(title: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_completed: false,
            user_id: user_id.into(),
        }
    }
}

/// Partial update; only the columns that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl TodoPatch {
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn completed(is_completed: bool) -> Self {
        Self {
            is_completed: Some(is_completed),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_id_parse() {
        let id: TodoId = " 42 ".parse().unwrap();
        assert_eq!(id, TodoId::new(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<TodoId>().is_err());
    }

    #[test]
    fn test_todo_deserializes_remote_row() {
        let raw = r#"{
            "id": 7,
            "title": "Buy milk",
            "is_completed": true,
            "user_id": "8f1c2e4a-0000-4000-8000-000000000001",
            "created_at": "2024-05-01T12:30:00.123456+00:00"
        }"#;
        let todo: Todo = serde_json::from_str(raw).unwrap();
        assert_eq!(todo.id, TodoId::new(7));
        assert_eq!(todo.title, "Buy milk");
        assert!(todo.is_completed);
        assert_eq!(todo.created_at.timestamp(), 1_714_566_600);
    }

    #[test]
    fn test_patch_skips_absent_columns() {
        let rendered = serde_json::to_value(TodoPatch::completed(true)).unwrap();
        assert_eq!(rendered, serde_json::json!({ "is_completed": true }));

        let rendered = serde_json::to_value(TodoPatch::title("New")).unwrap();
        assert_eq!(rendered, serde_json::json!({ "title": "New" }));
    }

    #[test]
    fn test_apply_touches_only_patched_columns() {
        let mut todo = Todo {
            id: TodoId::new(1),
            title: "A".to_string(),
            is_completed: false,
            user_id: "user".to_string(),
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        };
        todo.apply(&TodoPatch::completed(true));
        assert_eq!(todo.title, "A");
        assert!(todo.is_completed);

        todo.apply(&TodoPatch::title("B"));
        assert_eq!(todo.title, "B");
        assert!(todo.is_completed);
    }

    #[test]
    fn test_new_todo_defaults_to_incomplete() {
        let new_todo = NewTodo::new("Write report", "user");
        assert!(!new_todo.is_completed);
        assert_eq!(new_todo.user_id, "user");
    }
}
