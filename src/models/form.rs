use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Assignee, DueDate, TodoRecord};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a title (use Title or short title).")]
    TitleRequired,

    #[error("Due date must be dd/mm/yyyy, got \"{0}\".")]
    InvalidDueDate(String),

    #[error("Due date {0} must be in the future.")]
    DueDateNotInFuture(DueDate),

    #[error("Unknown person \"{0}\".")]
    UnknownAssignee(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DueDatePolicy {
    #[default]
    AnyDate,
    FutureOnly,
}

impl DueDatePolicy {
    pub fn check(self, due: Option<&DueDate>, today: NaiveDate) -> Result<(), ValidationError> {
        match (self, due) {
            (DueDatePolicy::FutureOnly, Some(due)) if due.date().is_some_and(|d| d <= today) => {
                Err(ValidationError::DueDateNotInFuture(due.clone()))
            }
            _ => Ok(()),
        }
    }
}

/// Validated, trimmed values for the four editable fields of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoFields {
    pub title: String,
    pub description: String,
    pub due_date: Option<DueDate>,
    pub assigned: Option<Assignee>,
}

/// Raw text of the create form, kept as typed so a rejected submission can
/// be shown again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoForm {
    pub title: String,
    pub short_title: String,
    pub description: String,
    pub due_date: String,
    pub assigned: String,
}

impl TodoForm {
    /// The short title wins when it has any non-blank content.
    pub fn resolve_title(&self) -> Option<String> {
        [&self.short_title, &self.title]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn validate(
        &self,
        policy: DueDatePolicy,
        today: NaiveDate,
    ) -> Result<TodoFields, ValidationError> {
        let title = self.resolve_title().ok_or(ValidationError::TitleRequired)?;
        let due_date = DueDate::parse_optional(&self.due_date)?;
        policy.check(due_date.as_ref(), today)?;

        Ok(TodoFields {
            title,
            description: self.description.trim().to_string(),
            due_date,
            assigned: Assignee::parse_optional(&self.assigned)?,
        })
    }
}

/// Raw text of the edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub assigned: String,
    pub replace_attachment: bool,
}

impl EditForm {
    pub fn from_record(record: &TodoRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            due_date: record
                .due_date
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            assigned: record
                .assigned
                .as_ref()
                .map(|a| a.as_str().to_string())
                .unwrap_or_default(),
            replace_attachment: false,
        }
    }

    /// Edits only trim; the title may be left blank.
    pub fn to_fields(&self) -> Result<TodoFields, ValidationError> {
        Ok(TodoFields {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            due_date: DueDate::parse_optional(&self.due_date)?,
            assigned: Assignee::parse_optional(&self.assigned)?,
        })
    }
}
