use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{LocalStorage, SqliteStorage, TodoStore};
use crate::error::AppError;
use crate::models::DueDatePolicy;
use crate::services::TodoService;

#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<TodoService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Loads the stored list from `storage` and wires up the service.
    pub async fn new(storage: Arc<dyn LocalStorage>, config: AppConfig) -> Self {
        let store = TodoStore::new(storage, config.storage_key.clone());
        let policy = if config.require_future_due_dates {
            DueDatePolicy::FutureOnly
        } else {
            DueDatePolicy::AnyDate
        };

        Self {
            todos: Arc::new(TodoService::load(store, policy).await),
            config: Arc::new(config),
        }
    }

    pub async fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let storage = SqliteStorage::connect(&config.database_url).await?;
        Ok(Self::new(Arc::new(storage), config).await)
    }
}
