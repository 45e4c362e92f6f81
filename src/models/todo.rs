use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::models::{Attachment, TodoFields, ValidationError};

/// One to-do item. Field names on the wire match the stored list format
/// (`dueDate`, `createdAt`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "due_date_field")]
    pub due_date: Option<DueDate>,
    #[serde(default, with = "assignee_field")]
    pub assigned: Option<Assignee>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

impl TodoRecord {
    pub fn new(fields: TodoFields, attachment: Option<Attachment>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            assigned: fields.assigned,
            created_at: Utc::now(),
            attachment,
        }
    }

    /// Overwrites every editable text field. `id`, `created_at` and the
    /// attachment are left alone.
    pub fn apply(&mut self, fields: TodoFields) {
        self.title = fields.title;
        self.description = fields.description;
        self.due_date = fields.due_date;
        self.assigned = fields.assigned;
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(No title)"
        } else {
            &self.title
        }
    }

    /// First 120 characters of the description.
    pub fn description_preview(&self) -> String {
        self.description.chars().take(120).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Assignee {
    Lalita,
    Simon,
    Avyaan,
    /// A name outside the team, kept as written in an older stored list.
    Unlisted(String),
}

impl Assignee {
    pub const ALL: [Assignee; 3] = [Assignee::Lalita, Assignee::Simon, Assignee::Avyaan];

    pub fn as_str(&self) -> &str {
        match self {
            Assignee::Lalita => "Lalita",
            Assignee::Simon => "Simon",
            Assignee::Avyaan => "Avyaan",
            Assignee::Unlisted(name) => name,
        }
    }

    /// Blank input means "nobody".
    pub fn parse_optional(raw: &str) -> Result<Option<Self>, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some)
    }

    /// Like [`Assignee::parse_optional`], but a name outside the team is
    /// kept instead of rejected.
    pub fn from_stored(raw: &str) -> Option<Self> {
        Self::parse_optional(raw).unwrap_or_else(|_| {
            warn!("stored assignee {:?} is not on the team list, keeping it as text", raw);
            Some(Assignee::Unlisted(raw.trim().to_string()))
        })
    }
}

impl FromStr for Assignee {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Assignee::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownAssignee(s.to_string()))
    }
}

impl fmt::Display for Assignee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Due date of a record. Forms only ever produce [`DueDate::On`], written as
/// `dd/mm/yyyy` at every text boundary; free text found in an older stored
/// list is kept as [`DueDate::Unparsed`] and shown as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DueDate {
    On(NaiveDate),
    Unparsed(String),
}

impl DueDate {
    pub const FORMAT: &'static str = "%d/%m/%Y";

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DueDate::On(date) => Some(*date),
            DueDate::Unparsed(_) => None,
        }
    }

    pub fn parse_optional(raw: &str) -> Result<Option<Self>, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some)
    }

    pub fn from_stored(raw: &str) -> Option<Self> {
        Self::parse_optional(raw).unwrap_or_else(|_| {
            warn!("stored due date {:?} is not dd/mm/yyyy, keeping it as text", raw);
            Some(DueDate::Unparsed(raw.trim().to_string()))
        })
    }
}

impl FromStr for DueDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), Self::FORMAT)
            .map(DueDate::On)
            .map_err(|_| ValidationError::InvalidDueDate(s.to_string()))
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueDate::On(date) => write!(f, "{}", date.format(Self::FORMAT)),
            DueDate::Unparsed(text) => f.write_str(text),
        }
    }
}

// Stored lists write a missing value as "" rather than null, and older lists
// may hold free text the forms would reject today.
mod due_date_field {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DueDate;

    pub fn serialize<S: Serializer>(value: &Option<DueDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.collect_str(date),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DueDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        Ok(DueDate::from_stored(&raw))
    }
}

mod assignee_field {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Assignee;

    pub fn serialize<S: Serializer>(value: &Option<Assignee>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_ref().map(Assignee::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Assignee>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        Ok(Assignee::from_stored(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TodoRecord {
        TodoRecord::new(
            TodoFields {
                title: "Buy milk".to_string(),
                description: "2%".to_string(),
                due_date: Some("01/01/2030".parse().unwrap()),
                assigned: Some(Assignee::Simon),
            },
            None,
        )
    }

    #[test]
    fn test_due_date_parse_and_format() {
        let date: DueDate = "1/2/2030".parse().unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2030, 2, 1));
        assert_eq!(date.to_string(), "01/02/2030");

        assert_eq!(DueDate::parse_optional("  ").unwrap(), None);
        assert!(matches!(
            "2030-01-01".parse::<DueDate>(),
            Err(ValidationError::InvalidDueDate(_))
        ));
        assert!("31/02/2030".parse::<DueDate>().is_err());
    }

    #[test]
    fn test_assignee_is_a_closed_set() {
        assert_eq!(Assignee::parse_optional("Simon").unwrap(), Some(Assignee::Simon));
        assert_eq!(Assignee::parse_optional("").unwrap(), None);
        assert!(matches!(
            Assignee::parse_optional("Mallory"),
            Err(ValidationError::UnknownAssignee(_))
        ));
    }

    #[test]
    fn test_stored_free_text_is_kept_verbatim() {
        assert_eq!(Assignee::from_stored("simon"), Some(Assignee::Simon));
        assert_eq!(Assignee::from_stored(" "), None);
        assert_eq!(
            Assignee::from_stored("Bob"),
            Some(Assignee::Unlisted("Bob".to_string()))
        );

        let due = DueDate::from_stored("next week").unwrap();
        assert_eq!(due, DueDate::Unparsed("next week".to_string()));
        assert_eq!(due.date(), None);
        assert_eq!(due.to_string(), "next week");
    }

    #[test]
    fn test_json_field_names_match_stored_format() {
        let record = sample();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["title"], "Buy milk");
        assert_eq!(value["dueDate"], "01/01/2030");
        assert_eq!(value["assigned"], "Simon");
        assert!(value["createdAt"].is_string());
        assert!(value["attachment"].is_null());
    }

    #[test]
    fn test_reads_list_written_by_the_browser_app() {
        let stored = r#"[{
            "id": "t-1700000000000-42",
            "title": "Old task",
            "description": "",
            "dueDate": "",
            "assigned": "",
            "createdAt": "2023-11-14T22:13:20.000Z",
            "attachment": {"name": "a.png", "type": "image/png", "dataUrl": "data:image/png;base64,AAEC"}
        }]"#;

        let todos: Vec<TodoRecord> = serde_json::from_str(stored).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].due_date, None);
        assert_eq!(todos[0].assigned, None);
        assert_eq!(todos[0].attachment.as_ref().unwrap().mime_type, "image/png");
    }

    #[test]
    fn test_one_free_text_record_does_not_spoil_the_list() {
        let stored = r#"[
            {"id": "a", "title": "keep me", "description": "", "dueDate": "01/02/2030",
             "assigned": "Simon", "createdAt": "2023-11-14T22:13:20.000Z", "attachment": null},
            {"id": "b", "title": "typed by hand", "description": "", "dueDate": "next week",
             "assigned": "Bob", "createdAt": "2023-11-14T22:13:21.000Z", "attachment": null}
        ]"#;

        let todos: Vec<TodoRecord> = serde_json::from_str(stored).unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].assigned, Some(Assignee::Simon));
        assert_eq!(todos[1].assigned, Some(Assignee::Unlisted("Bob".to_string())));

        let value = serde_json::to_value(&todos).unwrap();
        assert_eq!(value[1]["dueDate"], "next week");
        assert_eq!(value[1]["assigned"], "Bob");
    }

    #[test]
    fn test_apply_keeps_identity_and_attachment() {
        let mut record = sample();
        record.attachment = Some(Attachment::from_bytes("n.txt", "text/plain", b"hi"));
        let before = record.clone();

        record.apply(TodoFields {
            title: "Buy oat milk".to_string(),
            description: String::new(),
            due_date: None,
            assigned: None,
        });

        assert_eq!(record.id, before.id);
        assert_eq!(record.created_at, before.created_at);
        assert_eq!(record.attachment, before.attachment);
        assert_eq!(record.title, "Buy oat milk");
        assert_eq!(record.assigned, None);
    }

    #[test]
    fn test_description_preview_truncates_on_chars() {
        let mut record = sample();
        record.description = "é".repeat(200);
        assert_eq!(record.description_preview().chars().count(), 120);
    }
}
