//! Row and payload types for the `todos` table.
//!
//! # Design
//! Bookkeeping timestamps live in `BaseRecord`, embedded by composition and
//! flattened both into the JSON object and into the SQL row. Soft delete is
//! the nullable `deleted_at` timestamp, never a separate flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamps shared by every stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BaseRecord {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set once the row is soft-deleted; such rows are invisible to reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl BaseRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A single todo item as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: i64,
    pub action: String,
    pub completed: bool,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub base: BaseRecord,
}

/// Request payload for creating a todo. Any `id` sent by the client is
/// ignored; the store assigns one. Omitted fields take their zero values, so
/// `{}` creates an empty, open todo.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub completed: bool,
}

/// Request payload for updating a todo. Keys present in the JSON overwrite the
/// stored field; omitted keys keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    pub action: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// Merges the present fields into `todo`.
    pub fn apply_to(self, todo: &mut Todo) {
        if let Some(action) = self.action {
            todo.action = action;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}
