//! Server-side HTML for the single page and its confirmation/error pages.
//!
//! Whole pages are tera templates under `templates/`, autoescaped. The
//! widgets in the submodules are built as strings and every piece of record
//! text in them goes through [`html_escape`].

mod detail;
mod form;
mod list;

use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

use axum::http::StatusCode;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::error;

use crate::error::AppError;
use crate::models::TodoRecord;
use crate::services::{BoardSnapshot, Notice, UiMode};

pub use detail::detail_card;
pub use form::{create_form, edit_form, pending_attachment_control};
pub use list::list_card;

pub const APP_TITLE: &str = "MY Todo App";

static TEMPLATES: OnceLock<Tera> = OnceLock::new();

fn templates() -> &'static Tera {
    TEMPLATES.get_or_init(|| {
        let mut tera = Tera::default();
        let loaded = tera.add_raw_templates(vec![
            ("layout.html", include_str!("../../templates/layout.html")),
            ("page.html", include_str!("../../templates/page.html")),
            (
                "confirm_delete.html",
                include_str!("../../templates/confirm_delete.html"),
            ),
            ("error.html", include_str!("../../templates/error.html")),
        ]);
        if let Err(e) = loaded {
            error!("failed to load page templates: {}", e);
        }
        tera
    })
}

fn render(name: &str, context: &Context) -> Result<String, AppError> {
    Ok(templates().render(name, context)?)
}

/// Escapes HTML special characters, borrowing when nothing needs escaping.
pub fn html_escape(s: &str) -> Cow<'_, str> {
    if s.contains(['&', '<', '>', '"', '\'']) {
        let mut escaped = String::with_capacity(s.len() + 8);
        for c in s.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                _ => escaped.push(c),
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(s)
    }
}

pub fn format_created_at(created_at: &DateTime<Utc>) -> String {
    created_at
        .with_timezone(&Local)
        .format("%d/%m/%Y, %H:%M:%S")
        .to_string()
}

/// Escaped display text, or "-" when the value is absent.
pub(crate) fn or_dash<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| html_escape(&v.to_string()).into_owned())
}

#[derive(Serialize)]
struct NoticeView<'a> {
    class: &'static str,
    text: &'a str,
}

impl<'a> From<&'a Notice> for NoticeView<'a> {
    fn from(notice: &'a Notice) -> Self {
        match notice {
            Notice::Success(text) => Self {
                class: "alert-success",
                text,
            },
            Notice::Error(text) => Self {
                class: "alert-danger",
                text,
            },
        }
    }
}

/// The main page: form area, list and detail card.
pub fn page(snapshot: &BoardSnapshot) -> Result<String, AppError> {
    let mut context = Context::new();
    context.insert("title", APP_TITLE);
    context.insert("notice", &snapshot.notice.as_ref().map(NoticeView::from));
    context.insert("form_area", &form_area(snapshot));
    context.insert("list", &list_card(&snapshot.todos, snapshot.list_visible));
    context.insert("detail", &detail_card(snapshot.selected()));
    render("page.html", &context)
}

// Falls back to the create form when the edit target is gone.
fn form_area(snapshot: &BoardSnapshot) -> String {
    let target = |id: &str| snapshot.todos.iter().find(|t| t.id == id);
    match &snapshot.mode {
        UiMode::Editing { id, form } => match target(id) {
            Some(record) => edit_form(record, form),
            None => create_form(&snapshot.form),
        },
        UiMode::AwaitingAttachmentForEdit { id, pending } => match target(id) {
            Some(record) => pending_attachment_control(record, pending),
            None => create_form(&snapshot.form),
        },
        UiMode::Idle => create_form(&snapshot.form),
    }
}

pub fn confirm_delete_page(record: &TodoRecord) -> Result<String, AppError> {
    let mut context = Context::new();
    context.insert("title", "Delete to-do");
    context.insert("todo_title", record.display_title());
    context.insert("id", &record.id);
    render("confirm_delete.html", &context)
}

/// Never fails: a template problem degrades to a bare page.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let mut context = Context::new();
    context.insert("title", "Error");
    context.insert("status", &status.to_string());
    context.insert("message", message);

    render("error.html", &context).unwrap_or_else(|e| {
        error!("failed to render error page: {}", e);
        format!(
            "<!DOCTYPE html><html><body><h1>{}</h1><p>{}</p></body></html>",
            status,
            html_escape(message)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TodoFields, TodoForm};

    fn record(title: &str) -> TodoRecord {
        TodoRecord::new(
            TodoFields {
                title: title.to_string(),
                description: String::new(),
                due_date: None,
                assigned: None,
            },
            None,
        )
    }

    fn snapshot(todos: Vec<TodoRecord>) -> BoardSnapshot {
        BoardSnapshot {
            todos,
            selected_id: None,
            list_visible: true,
            mode: UiMode::Idle,
            form: TodoForm::default(),
            notice: None,
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("plain"), Cow::Borrowed("plain"));
        assert_eq!(
            html_escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_page_shows_notice_and_create_form() {
        let mut snap = snapshot(Vec::new());
        snap.notice = Some(Notice::Error("Please enter a title".to_string()));

        let html = page(&snap).unwrap();
        assert!(html.contains("alert-danger"));
        assert!(html.contains("Please enter a title"));
        assert!(html.contains(r#"action="/todos""#));
        assert!(html.contains("No todos yet."));
        assert!(html.contains("Select a To-Do"));
    }

    #[test]
    fn test_page_renders_pending_attachment_control() {
        let todo = record("Report");
        let mut snap = snapshot(vec![todo.clone()]);
        snap.mode = UiMode::AwaitingAttachmentForEdit {
            id: todo.id.clone(),
            pending: TodoFields {
                title: "Report v2".to_string(),
                description: String::new(),
                due_date: None,
                assigned: None,
            },
        };

        let html = page(&snap).unwrap();
        assert!(html.contains(r#"action="/edit/attachment""#));
        assert!(html.contains("Save Edit"));
        assert!(!html.contains(r#"action="/todos""#));
    }

    #[test]
    fn test_page_falls_back_to_create_form_for_stale_edit() {
        let mut snap = snapshot(Vec::new());
        snap.mode = UiMode::Editing {
            id: "gone".to_string(),
            form: Default::default(),
        };
        assert!(page(&snap).unwrap().contains(r#"action="/todos""#));
    }

    #[test]
    fn test_confirm_page_escapes_title() {
        let html = confirm_delete_page(&record("<script>")).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"name="confirm" value="yes""#));
    }

    #[test]
    fn test_error_page_shows_status_and_escaped_message() {
        let html = error_page(StatusCode::NOT_FOUND, "<gone>");
        assert!(html.contains("404 Not Found"));
        assert!(html.contains("&lt;gone&gt;"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_page_title_comes_from_layout() {
        let html = page(&snapshot(Vec::new())).unwrap();
        assert!(html.contains(&format!("<title>{}</title>", APP_TITLE)));
    }
}
