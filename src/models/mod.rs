pub mod attachment;
pub mod form;
pub mod todo;

pub use attachment::{Attachment, DataUrlError};
pub use form::{DueDatePolicy, EditForm, TodoFields, TodoForm, ValidationError};
pub use todo::{Assignee, DueDate, TodoRecord};
