use std::collections::HashMap;

use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, Path};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::post;
use axum::{Form, Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::{Attachment, EditForm, TodoForm};
use crate::services::PendingOutcome;
use crate::state::AppState;
use crate::views;

const ATTACHMENT_FIELD: &str = "attachment";

#[derive(Deserialize)]
struct DeleteForm {
    #[serde(default)]
    confirm: String,
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_request_bytes;

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/todos", post(create_todo))
        .route("/todos/{id}/select", post(select_todo))
        .route("/todos/{id}/edit", post(begin_edit))
        .route("/todos/{id}/update", post(update_todo))
        .route("/todos/{id}/delete", get(confirm_delete).post(delete_todo))
        .route("/todos/{id}/attachment", get(download_attachment))
        .route("/edit/attachment", post(complete_pending_edit))
        .route("/edit/cancel", post(cancel_edit))
        .route("/list/toggle", post(toggle_list))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.todos.ping().await?;
    Ok(StatusCode::OK)
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let snapshot = state.todos.snapshot().await;
    Ok(Html(views::page(&snapshot)?))
}

async fn create_todo(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut submission = Submission::read(multipart, state.config.max_upload_bytes).await?;
    let form = TodoForm {
        title: submission.take("title"),
        short_title: submission.take("short_title"),
        description: submission.take("description"),
        due_date: submission.take("due_date"),
        assigned: submission.take("assigned"),
    };

    match state.todos.add(form, submission.attachment).await {
        Ok(todo) => debug!("todo {} added through the form", todo.id),
        Err(AppError::Validation(e)) => warn!("rejected new todo: {}", e),
        Err(e) => return Err(e),
    }

    Ok(Redirect::to("/"))
}

async fn select_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Redirect {
    state.todos.select(&id).await;
    Redirect::to("/")
}

async fn toggle_list(State(state): State<AppState>) -> Redirect {
    let visible = state.todos.toggle_list().await;
    debug!("todo list visible: {}", visible);
    Redirect::to("/")
}

async fn begin_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Redirect {
    if !state.todos.begin_edit(&id).await {
        debug!("edit requested for unknown todo {}", id);
    }
    Redirect::to("/")
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut submission = Submission::read(multipart, state.config.max_upload_bytes).await?;
    let form = EditForm {
        title: submission.take("title"),
        description: submission.take("description"),
        due_date: submission.take("due_date"),
        assigned: submission.take("assigned"),
        replace_attachment: is_checked(&submission.take("replace_attachment")),
    };

    match state.todos.submit_edit(&id, form, submission.attachment).await {
        Ok(outcome) => debug!("edit of {} finished as {:?}", id, outcome),
        Err(AppError::Validation(e)) => warn!("rejected edit of {}: {}", id, e),
        Err(e) => return Err(e),
    }

    Ok(Redirect::to("/"))
}

async fn complete_pending_edit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let submission = Submission::read(multipart, state.config.max_upload_bytes).await?;

    let outcome = state.todos.complete_pending_edit(submission.attachment).await?;
    if outcome == PendingOutcome::Discarded {
        info!("pending edit dropped, its todo no longer exists");
    }

    Ok(Redirect::to("/"))
}

async fn cancel_edit(State(state): State<AppState>) -> Redirect {
    state.todos.cancel_edit().await;
    Redirect::to("/")
}

async fn confirm_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let todo = state.todos.find(&id).await.ok_or(AppError::NotFound)?;
    Ok(Html(views::confirm_delete_page(&todo)?))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, AppError> {
    if form.confirm != "yes" {
        debug!("delete of {} not confirmed", id);
        return Ok(Redirect::to("/"));
    }

    if state.todos.delete(&id).await?.is_none() {
        debug!("delete of unknown todo {} ignored", id);
    }

    Ok(Redirect::to("/"))
}

async fn download_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let attachment = state
        .todos
        .find(&id)
        .await
        .and_then(|todo| todo.attachment)
        .ok_or(AppError::NotFound)?;

    let (mime_type, bytes) = attachment.decode()?;
    let disposition = format!("inline; filename=\"{}\"", header_safe(&attachment.name));

    Ok((
        [
            (header::CONTENT_TYPE, mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

fn is_checked(value: &str) -> bool {
    matches!(value.trim(), "on" | "true" | "1" | "yes")
}

fn header_safe(name: &str) -> String {
    name.chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"') || c == ' ' { c } else { '_' })
        .collect()
}

/// Text fields and the optional file of a multipart form post.
#[derive(Default)]
struct Submission {
    fields: HashMap<String, String>,
    attachment: Option<Attachment>,
}

impl Submission {
    /// Files over `max_file_bytes` are logged and left out; the text fields
    /// still come through.
    async fn read(mut multipart: Multipart, max_file_bytes: usize) -> Result<Self, AppError> {
        let mut submission = Self::default();
        let mut attachment_failed = false;

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                // A failed file read usually leaves the rest of the body unreadable.
                Err(e) if attachment_failed => {
                    warn!("stopped reading form after attachment failure: {}", e);
                    break;
                }
                Err(e) => return Err(AppError::BadRequest(format!("Malformed form data: {}", e))),
            };

            let name = field.name().unwrap_or_default().to_string();
            if name == ATTACHMENT_FIELD {
                match read_attachment(field, max_file_bytes).await {
                    Upload::File(attachment) => submission.attachment = Some(attachment),
                    Upload::Empty => {}
                    Upload::Failed => attachment_failed = true,
                }
                continue;
            }

            let value = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("Malformed form field {}: {}", name, e))
            })?;
            submission.fields.insert(name, value);
        }

        Ok(submission)
    }

    fn take(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }
}

enum Upload {
    /// The file input was left empty.
    Empty,
    File(Attachment),
    Failed,
}

async fn read_attachment(mut field: Field<'_>, max_bytes: usize) -> Upload {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let mime_type = field.content_type().unwrap_or_default().to_string();
    if file_name.is_empty() {
        return Upload::Empty;
    }

    let mut bytes = Vec::new();
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) if bytes.len() + chunk.len() > max_bytes => {
                warn!("attachment {} is larger than {} bytes, skipping it", file_name, max_bytes);
                return Upload::Failed;
            }
            Ok(Some(chunk)) => bytes.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => {
                warn!("file read error for {}: {}", file_name, e);
                return Upload::Failed;
            }
        }
    }

    debug!("read attachment {} ({} bytes, {})", file_name, bytes.len(), mime_type);
    Upload::File(Attachment::from_bytes(&file_name, &mime_type, &bytes))
}
