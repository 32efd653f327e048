use crate::model::task::{MarkdownTask, Task, TaskType};
use crate::parse::location::location_lines;
use crate::parse::task_parser::starts_with_type_marker;

/// Written in place of an empty title
pub const EMPTY_TITLE_PLACEHOLDER: &str = "New task...";

/// The `[ ]`-style token for a task's status
pub fn status_token(task: &MarkdownTask) -> String {
    format!("[{}]", task.status.checkbox_char())
}

/// Serialize one task line in canonical form: `- [x] [event] Title`
pub fn serialize_task_line(task: &MarkdownTask) -> String {
    let title = match task.title.trim() {
        "" => EMPTY_TITLE_PLACEHOLDER,
        t => t,
    };

    let mut line = format!("- {} ", status_token(task));
    match task.task_type {
        // A plain task whose title looks like a marker gets an explicit one,
        // otherwise it would be read back as that type
        TaskType::Task if starts_with_type_marker(title) => line.push_str("[task] "),
        TaskType::Task => {}
        other => {
            line.push('[');
            line.push_str(other.as_str());
            line.push_str("] ");
        }
    }
    line.push_str(title);
    line
}

/// Serialize a task and its location metadata. `indent` is the number of
/// spaces in front of the task line.
pub fn serialize_task(task: &Task, indent: usize) -> Vec<String> {
    let indent_str = " ".repeat(indent);
    let mut lines = vec![format!("{}{}", indent_str, serialize_task_line(&task.markdown()))];
    if let Some(ref location) = task.location {
        lines.extend(location_lines(location, indent));
    }
    lines
}
