pub mod board;
pub mod todo_service;

pub use board::{BoardSnapshot, EditOutcome, Notice, PendingOutcome, TodoBoard, UiMode};
pub use todo_service::TodoService;
