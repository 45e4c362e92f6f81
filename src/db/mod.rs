pub mod repository;
pub mod storage;

pub use repository::TodoStore;
pub use storage::{LocalStorage, MemoryStorage, SqliteStorage};
