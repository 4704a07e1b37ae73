//! Daily todo list. Items expire at local midnight.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoList {
    /// Newest first.
    items: Vec<TodoItem>,
}

impl TodoList {
    pub fn new(items: Vec<TodoItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn add(&mut self, text: &str, now_ms: i64) -> Result<&TodoItem, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText { field: "todo text" });
        }
        self.items.insert(
            0,
            TodoItem {
                id: Uuid::new_v4().to_string(),
                text: text.to_string(),
                completed: false,
                created_at: now_ms,
            },
        );
        Ok(&self.items[0])
    }

    /// Flip completion. Returns `false` for an unknown id.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.completed = !item.completed;
                true
            }
            None => false,
        }
    }

    /// Returns `false` for an unknown id.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Drop items created before `cutoff_ms`. Returns how many were removed.
    pub fn purge_before(&mut self, cutoff_ms: i64) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.created_at >= cutoff_ms);
        before - self.items.len()
    }
}
