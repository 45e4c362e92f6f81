use std::fmt::Write;

use crate::models::TodoRecord;
use crate::views::{format_created_at, html_escape, or_dash};

pub fn list_card(todos: &[TodoRecord], visible: bool) -> String {
    let mut html = String::from(
        r#"<div class="card">
<ul class="list-group list-group-flush">
<li class="list-group-item d-flex justify-content-between align-items-center">
<h5 class="mb-0">Todos</h5>
<form method="post" action="/list/toggle"><button type="submit" class="btn btn-sm btn-link" title="Toggle list">Toggle</button></form>
</li>
</ul>
"#,
    );

    let hidden = if visible { "" } else { " d-none" };
    let _ = writeln!(html, r#"<div id="todoListItems" class="{}">"#, hidden.trim());

    if todos.is_empty() {
        html.push_str(r#"<div class="list-group-item text-muted">No todos yet.</div>"#);
    } else {
        for todo in todos {
            html.push_str(&row(todo));
        }
    }

    html.push_str("</div>\n</div>\n");
    html
}

// The select button covers the row body; edit and delete are their own
// forms so they never select.
fn row(todo: &TodoRecord) -> String {
    let id = html_escape(&todo.id);
    let attachments = if todo.attachment.is_some() {
        "1 Attachment"
    } else {
        "0"
    };

    format!(
        r#"<div class="list-group-item">
<div class="d-flex justify-content-between align-items-start">
<form method="post" action="/todos/{id}/select" class="flex-grow-1">
<button type="submit" class="btn btn-link text-start text-reset p-0 w-100">
<h6 class="mb-1">{title}</h6>
<p class="mb-1 small text-muted">{preview}</p>
<span class="d-flex align-items-center gap-2">
<span class="mb-0"><strong>Due:</strong> {due}</span>
<span class="badge bg-info text-dark">{assigned}</span>
<span class="badge bg-secondary">{attachments}</span>
</span>
</button>
</form>
<div class="text-end">
<p class="small text-muted mb-1">Created: {created}</p>
<form method="post" action="/todos/{id}/edit" class="d-inline action-edit"><button type="submit" class="btn btn-sm btn-link" title="Edit">Edit</button></form>
<a href="/todos/{id}/delete" class="btn btn-sm btn-link action-delete" title="Delete">Delete</a>
</div>
</div>
</div>
"#,
        title = html_escape(todo.display_title()),
        preview = html_escape(&todo.description_preview()),
        due = or_dash(todo.due_date.as_ref()),
        assigned = or_dash(todo.assigned.as_ref()),
        created = format_created_at(&todo.created_at),
    )
}
