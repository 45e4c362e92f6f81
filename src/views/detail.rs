use crate::models::TodoRecord;
use crate::views::{html_escape, or_dash};

pub fn detail_card(selected: Option<&TodoRecord>) -> String {
    let Some(todo) = selected else {
        return r#"<div id="todoDetailCard" class="card mt-3">
<div class="card-body">
<h5 class="card-title text-muted">Select a To-Do</h5>
</div>
</div>
"#
        .to_string();
    };

    let id = html_escape(&todo.id);
    let attachment = match &todo.attachment {
        Some(att) if att.is_image() => format!(
            r#"<div>Attachment: {name}</div>
<img src="{src}" alt="attachment" class="attachment-thumb mt-2">"#,
            name = html_escape(&att.name),
            src = html_escape(&att.data_url),
        ),
        Some(att) => format!(
            r#"<div>Attachment: {name}</div>
<a href="/todos/{id}/attachment" target="_blank" rel="noreferrer">Open attachment</a>"#,
            name = html_escape(&att.name),
        ),
        None => String::new(),
    };

    format!(
        r#"<div id="todoDetailCard" class="card mt-3">
<div class="card-body">
<h5 class="card-title">{title}</h5>
<p class="card-text">{description}</p>
<p class="mb-1"><strong>Due:</strong> {due}</p>
<p class="mb-1"><strong>Assigned:</strong> {assigned}</p>
<div id="detailAttachments">{attachment}</div>
<div class="mt-3">
<form method="post" action="/todos/{id}/edit" class="d-inline"><button type="submit" class="btn btn-sm btn-warning me-2">Edit</button></form>
<a href="/todos/{id}/delete" class="btn btn-sm btn-danger">Delete</a>
</div>
</div>
</div>
"#,
        title = html_escape(todo.display_title()),
        description = html_escape(&todo.description),
        due = or_dash(todo.due_date.as_ref()),
        assigned = or_dash(todo.assigned.as_ref()),
    )
}
