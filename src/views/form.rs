use std::fmt::Write;

use crate::models::{Assignee, EditForm, TodoFields, TodoForm, TodoRecord};
use crate::views::{html_escape, or_dash};

const ACCEPT_FILES: &str = "image/png, image/jpeg";

fn text_input(label: &str, name: &str, value: &str, placeholder: &str) -> String {
    format!(
        r#"<div class="mb-2">
<label class="form-label" for="{name}">{label}</label>
<input type="text" class="form-control" id="{name}" name="{name}" placeholder="{placeholder}" value="{value}" autocomplete="off">
</div>"#,
        name = name,
        label = label,
        placeholder = placeholder,
        value = html_escape(value),
    )
}

fn description_input(value: &str) -> String {
    format!(
        r#"<div class="mb-2">
<label class="form-label" for="description">Description:</label>
<textarea class="form-control" rows="3" id="description" name="description" placeholder="Description">{}</textarea>
</div>"#,
        html_escape(value)
    )
}

fn assignee_select(selected: &str) -> String {
    let mut html = String::from(
        r#"<label class="form-label" for="assigned">Assigned To Person (optional):</label>
<select class="form-select" id="assigned" name="assigned">
<option value="">--Select Person (optional)--</option>
"#,
    );
    let selected = selected.trim();
    let mut matched = selected.is_empty();
    for person in Assignee::ALL {
        let name = person.as_str();
        let marker = if name.eq_ignore_ascii_case(selected) {
            matched = true;
            " selected"
        } else {
            ""
        };
        let _ = writeln!(html, r#"<option value="{name}"{marker}>{name}</option>"#);
    }
    // Names kept from older lists stay visible until a listed person is picked.
    if !matched {
        let _ = writeln!(
            html,
            r#"<option value="{name}" selected>{name} (not on the list)</option>"#,
            name = html_escape(selected)
        );
    }
    html.push_str("</select>");
    html
}

fn due_and_assignee(due_date: &str, assigned: &str) -> String {
    format!(
        r#"<div class="row g-2 mb-2">
<div class="col-6">{}</div>
<div class="col-6">{}</div>
</div>"#,
        text_input("Due Date:", "due_date", due_date, "dd/mm/yyyy"),
        assignee_select(assigned)
    )
}

fn file_input(label: &str) -> String {
    format!(
        r#"<div class="mb-2">
<label class="form-label" for="attachment">{label}</label>
<input type="file" class="form-control" id="attachment" name="attachment" accept="{ACCEPT_FILES}">
</div>"#
    )
}

/// The add form, refilled with whatever was typed last time.
pub fn create_form(form: &TodoForm) -> String {
    format!(
        r#"<form class="card p-3 mb-3" method="post" action="/todos" enctype="multipart/form-data">
{title}
{description}
{due_assignee}
{file}
{short_title}
<div class="text-end"><button class="btn btn-primary" type="submit">+ Add Todo</button></div>
</form>"#,
        title = text_input("Title:", "title", &form.title, "Enter title"),
        description = description_input(&form.description),
        due_assignee = due_and_assignee(&form.due_date, &form.assigned),
        file = file_input("Attachments"),
        short_title = text_input(
            "Short Title (optional):",
            "short_title",
            &form.short_title,
            "Short title"
        ),
    )
}

pub fn edit_form(record: &TodoRecord, form: &EditForm) -> String {
    let current = record
        .attachment
        .as_ref()
        .map(|a| format!("Current attachment: {}", html_escape(&a.name)))
        .unwrap_or_else(|| "No attachment".to_string());
    let checked = if form.replace_attachment { " checked" } else { "" };

    format!(
        r#"<form class="card p-3 mb-3" method="post" action="/todos/{id}/update" enctype="multipart/form-data">
<h5 class="card-title">Edit to-do</h5>
{title}
{description}
{due_assignee}
<p class="small text-muted mb-1">{current}</p>
<div class="form-check mb-2">
<input class="form-check-input" type="checkbox" id="replace_attachment" name="replace_attachment" value="on"{checked}>
<label class="form-check-label" for="replace_attachment">Replace attachment</label>
</div>
{file}
<div class="text-end">
<button class="btn btn-secondary me-2" type="submit" formaction="/edit/cancel" formenctype="application/x-www-form-urlencoded">Cancel</button>
<button class="btn btn-primary" type="submit">Save</button>
</div>
</form>"#,
        id = html_escape(&record.id),
        title = text_input("Title:", "title", &form.title, "Enter title"),
        description = description_input(&form.description),
        due_assignee = due_and_assignee(&form.due_date, &form.assigned),
        file = file_input("New attachment"),
    )
}

/// Shown while text edits wait for a replacement file.
pub fn pending_attachment_control(record: &TodoRecord, pending: &TodoFields) -> String {
    format!(
        r#"<form class="card p-3 mb-3" method="post" action="/edit/attachment" enctype="multipart/form-data">
<h5 class="card-title">Replace attachment of {current}</h5>
<p class="small text-muted mb-1">Pending: {title} &middot; Due: {due} &middot; {assigned}</p>
{file}
<div class="text-end">
<button class="btn btn-secondary me-2" type="submit" formaction="/edit/cancel" formenctype="application/x-www-form-urlencoded">Cancel</button>
<button class="btn btn-sm btn-primary" type="submit">Save Edit</button>
</div>
</form>"#,
        current = html_escape(record.display_title()),
        title = html_escape(&pending.title),
        due = or_dash(pending.due_date.as_ref()),
        assigned = or_dash(pending.assigned.as_ref()),
        file = file_input("Attachments"),
    )
}
