use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::{
    Attachment, DueDatePolicy, EditForm, TodoFields, TodoForm, TodoRecord, ValidationError,
};

/// One-shot message shown on the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// What the form area of the page is doing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UiMode {
    #[default]
    Idle,
    /// The edit form is open for `id`, holding what the user typed.
    Editing { id: String, form: EditForm },
    /// Text edits for `id` are parked until a replacement file is supplied.
    AwaitingAttachmentForEdit { id: String, pending: TodoFields },
}

impl UiMode {
    pub fn target(&self) -> Option<&str> {
        match self {
            UiMode::Idle => None,
            UiMode::Editing { id, .. } | UiMode::AwaitingAttachmentForEdit { id, .. } => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Saved,
    AwaitingAttachment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOutcome {
    Saved,
    /// The record went away while the edit was parked.
    Discarded,
}

/// Everything a page render needs, detached from the live board.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub todos: Vec<TodoRecord>,
    pub selected_id: Option<String>,
    pub list_visible: bool,
    pub mode: UiMode,
    pub form: TodoForm,
    pub notice: Option<Notice>,
}

impl BoardSnapshot {
    pub fn selected(&self) -> Option<&TodoRecord> {
        let id = self.selected_id.as_deref()?;
        self.todos.iter().find(|t| t.id == id)
    }
}

/// In-memory application state: the list (newest first), the selection,
/// list visibility, the create-form draft and the edit mode.
#[derive(Debug, Clone)]
pub struct TodoBoard {
    todos: Vec<TodoRecord>,
    selected: Option<String>,
    list_visible: bool,
    mode: UiMode,
    form: TodoForm,
    notice: Option<Notice>,
    due_policy: DueDatePolicy,
}

impl TodoBoard {
    pub fn new(todos: Vec<TodoRecord>, due_policy: DueDatePolicy) -> Self {
        Self {
            todos,
            selected: None,
            list_visible: true,
            mode: UiMode::Idle,
            form: TodoForm::default(),
            notice: None,
            due_policy,
        }
    }

    pub fn todos(&self) -> &[TodoRecord] {
        &self.todos
    }

    pub fn get(&self, id: &str) -> Option<&TodoRecord> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn selected(&self) -> Option<&TodoRecord> {
        self.get(self.selected.as_deref()?)
    }

    pub fn mode(&self) -> &UiMode {
        &self.mode
    }

    pub fn form(&self) -> &TodoForm {
        &self.form
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Copies the state out for rendering and consumes the pending notice.
    pub fn snapshot(&mut self) -> BoardSnapshot {
        BoardSnapshot {
            todos: self.todos.clone(),
            selected_id: self.selected.clone(),
            list_visible: self.list_visible,
            mode: self.mode.clone(),
            form: self.form.clone(),
            notice: self.notice.take(),
        }
    }

    /// Validates the form and prepends a new record. On rejection the typed
    /// values stay in the form and the error becomes the notice.
    pub fn add(
        &mut self,
        form: TodoForm,
        attachment: Option<Attachment>,
        today: NaiveDate,
    ) -> Result<&TodoRecord, ValidationError> {
        let fields = match form.validate(self.due_policy, today) {
            Ok(fields) => fields,
            Err(e) => {
                self.form = form;
                self.notice = Some(Notice::Error(e.to_string()));
                return Err(e);
            }
        };

        let record = TodoRecord::new(fields, attachment);
        info!("created todo {} ({})", record.id, record.title);
        self.todos.insert(0, record);
        self.form = TodoForm::default();
        self.selected = None;

        Ok(&self.todos[0])
    }

    /// Unknown ids leave the selection untouched.
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            debug!("ignoring selection of unknown todo {}", id);
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    pub fn toggle_list(&mut self) -> bool {
        self.list_visible = !self.list_visible;
        self.list_visible
    }

    pub fn begin_edit(&mut self, id: &str) -> bool {
        let Some(record) = self.get(id) else {
            return false;
        };
        self.mode = UiMode::Editing {
            id: id.to_string(),
            form: EditForm::from_record(record),
        };
        true
    }

    /// Applies the edit form in one step. Asking to replace the attachment
    /// without sending a file parks the text edits until one arrives.
    pub fn submit_edit(
        &mut self,
        id: &str,
        form: EditForm,
        attachment: Option<Attachment>,
    ) -> Result<EditOutcome, AppError> {
        if self.get(id).is_none() {
            self.mode = UiMode::Idle;
            return Err(AppError::NotFound);
        }

        let fields = match form.to_fields() {
            Ok(fields) => fields,
            Err(e) => {
                self.notice = Some(Notice::Error(e.to_string()));
                self.mode = UiMode::Editing {
                    id: id.to_string(),
                    form,
                };
                return Err(e.into());
            }
        };

        match (form.replace_attachment, attachment) {
            (true, None) => {
                debug!("edit of {} waiting for a replacement attachment", id);
                self.mode = UiMode::AwaitingAttachmentForEdit {
                    id: id.to_string(),
                    pending: fields,
                };
                self.notice = Some(Notice::Success(
                    "Select a file, then press Save Edit.".to_string(),
                ));
                Ok(EditOutcome::AwaitingAttachment)
            }
            (true, Some(attachment)) => {
                self.commit(id, fields, Some(attachment));
                self.notice = Some(Notice::Success("Saved changes.".to_string()));
                Ok(EditOutcome::Saved)
            }
            (false, _) => {
                self.commit(id, fields, None);
                self.notice = Some(Notice::Success("Saved.".to_string()));
                Ok(EditOutcome::Saved)
            }
        }
    }

    /// Commits a parked edit against the current list. Without a file only
    /// the text fields are applied.
    pub fn complete_pending_edit(
        &mut self,
        attachment: Option<Attachment>,
    ) -> Result<PendingOutcome, AppError> {
        let (id, pending) = match std::mem::take(&mut self.mode) {
            UiMode::AwaitingAttachmentForEdit { id, pending } => (id, pending),
            other => {
                self.mode = other;
                return Err(AppError::BadRequest(
                    "No edit is waiting for an attachment".to_string(),
                ));
            }
        };

        if self.get(&id).is_none() {
            warn!("discarding pending edit for missing todo {}", id);
            return Ok(PendingOutcome::Discarded);
        }

        self.commit(&id, pending, attachment);
        self.notice = Some(Notice::Success("Saved changes.".to_string()));
        Ok(PendingOutcome::Saved)
    }

    pub fn cancel_edit(&mut self) -> bool {
        let was_editing = self.mode != UiMode::Idle;
        self.mode = UiMode::Idle;
        was_editing
    }

    /// Removes the record if present. Unknown ids are a no-op.
    pub fn delete(&mut self, id: &str) -> Option<TodoRecord> {
        let idx = self.todos.iter().position(|t| t.id == id)?;
        let removed = self.todos.remove(idx);

        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if self.mode.target() == Some(id) {
            self.mode = UiMode::Idle;
        }

        info!("deleted todo {} ({})", removed.id, removed.title);
        Some(removed)
    }

    fn commit(&mut self, id: &str, fields: TodoFields, attachment: Option<Attachment>) {
        if let Some(record) = self.todos.iter_mut().find(|t| t.id == id) {
            record.apply(fields);
            if let Some(attachment) = attachment {
                record.attachment = Some(attachment);
            }
            info!("updated todo {}", id);
        }
        self.mode = UiMode::Idle;
    }
}
