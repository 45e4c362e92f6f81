use chrono::Local;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::db::TodoStore;
use crate::error::AppError;
use crate::models::{Attachment, DueDatePolicy, EditForm, TodoForm, TodoRecord};
use crate::services::board::{BoardSnapshot, EditOutcome, PendingOutcome, TodoBoard};

/// Serializes every user action over the board and writes the whole list
/// back to storage after each change to it.
pub struct TodoService {
    board: Mutex<TodoBoard>,
    store: TodoStore,
}

impl TodoService {
    pub async fn load(store: TodoStore, due_policy: DueDatePolicy) -> Self {
        let todos = store.load().await;
        info!("todo board ready with {} todos", todos.len());
        Self {
            board: Mutex::new(TodoBoard::new(todos, due_policy)),
            store,
        }
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        self.board.lock().await.snapshot()
    }

    pub async fn find(&self, id: &str) -> Option<TodoRecord> {
        self.board.lock().await.get(id).cloned()
    }

    pub async fn add(
        &self,
        form: TodoForm,
        attachment: Option<Attachment>,
    ) -> Result<TodoRecord, AppError> {
        let today = Local::now().date_naive();
        self.update(|board| Ok(board.add(form, attachment, today)?.clone())).await
    }

    pub async fn select(&self, id: &str) -> bool {
        self.board.lock().await.select(id)
    }

    pub async fn toggle_list(&self) -> bool {
        self.board.lock().await.toggle_list()
    }

    pub async fn begin_edit(&self, id: &str) -> bool {
        self.board.lock().await.begin_edit(id)
    }

    pub async fn submit_edit(
        &self,
        id: &str,
        form: EditForm,
        attachment: Option<Attachment>,
    ) -> Result<EditOutcome, AppError> {
        self.update(|board| board.submit_edit(id, form, attachment)).await
    }

    pub async fn complete_pending_edit(
        &self,
        attachment: Option<Attachment>,
    ) -> Result<PendingOutcome, AppError> {
        self.update(|board| board.complete_pending_edit(attachment)).await
    }

    pub async fn cancel_edit(&self) -> bool {
        self.board.lock().await.cancel_edit()
    }

    pub async fn delete(&self, id: &str) -> Result<Option<TodoRecord>, AppError> {
        self.update(|board| Ok(board.delete(id))).await
    }

    /// Runs `change` against a copy of the board. The copy replaces the live
    /// board only once any change it made to the list has been stored, so a
    /// failed write leaves memory and storage in agreement.
    async fn update<T>(
        &self,
        change: impl FnOnce(&mut TodoBoard) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut board = self.board.lock().await;
        let mut next = board.clone();
        let result = change(&mut next);

        if next.todos() != board.todos() {
            if let Err(e) = self.store.save(next.todos()).await {
                warn!("todo list not saved, keeping the previous state: {}", e);
                return Err(e);
            }
        }

        *board = next;
        result
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }
}
