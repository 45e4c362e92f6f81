use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::AppError;

/// String key/value store with the semantics of browser local storage:
/// one value per key, writes replace the previous value outright.
#[async_trait]
pub trait LocalStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct SqliteStorage {
    db: SqlitePool,
}

impl SqliteStorage {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Opens (creating if missing) the database at `url` and runs migrations.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::migrated(pool).await
    }

    /// A private in-memory database. The pool is pinned to one connection
    /// because every SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl LocalStorage for SqliteStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }
}

/// Process-local storage for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let items = self.items.read().unwrap_or_else(|e| e.into_inner());
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut items = self.items.write().unwrap_or_else(|e| e.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise(storage: &dyn LocalStorage) {
        assert_eq!(storage.get_item("k").await.unwrap(), None);

        storage.set_item("k", "[1]").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("[1]"));

        storage.set_item("k", "[2]").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("[2]"));
        assert_eq!(storage.get_item("other").await.unwrap(), None);

        storage.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_sqlite_storage_overwrites_per_key() {
        let storage = SqliteStorage::in_memory()
            .await
            .expect("Failed to create test db");
        exercise(&storage).await;
    }

    #[tokio::test]
    async fn test_memory_storage_overwrites_per_key() {
        exercise(&MemoryStorage::new()).await;
    }
}
