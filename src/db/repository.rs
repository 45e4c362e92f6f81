use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::db::LocalStorage;
use crate::error::AppError;
use crate::models::TodoRecord;

/// The whole to-do list lives as one JSON array under a single key.
#[derive(Clone)]
pub struct TodoStore {
    storage: Arc<dyn LocalStorage>,
    key: String,
}

impl TodoStore {
    pub fn new(storage: Arc<dyn LocalStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Never fails: a missing key, unreadable storage or malformed JSON all
    /// load as an empty list.
    pub async fn load(&self) -> Vec<TodoRecord> {
        let raw = match self.storage.get_item(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored todos under {}", self.key);
                return Vec::new();
            }
            Err(e) => {
                error!("failed to read stored todos: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<TodoRecord>>(&raw) {
            Ok(todos) => {
                debug!("loaded {} todos from {}", todos.len(), self.key);
                todos
            }
            Err(e) => {
                warn!("stored todos under {} are malformed, starting empty: {}", self.key, e);
                Vec::new()
            }
        }
    }

    /// Replaces the stored list unconditionally.
    pub async fn save(&self, todos: &[TodoRecord]) -> Result<(), AppError> {
        let json = serde_json::to_string(todos)?;
        self.storage.set_item(&self.key, &json).await?;
        debug!("saved {} todos to {}", todos.len(), self.key);
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.storage.ping().await
    }
}
