use std::sync::LazyLock;

use regex::Regex;

use crate::model::task::{MarkdownTask, TaskStatus, TaskType};

/// `- [x] Title`: indent, bullet, checkbox char, rest of line
static TASK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([-*])\s+\[([ x>\-?])\]\s+(.*)$").unwrap());

/// Leading `[event] ` style marker on a title
static TYPE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\[(task|event|birthday|holiday)\]\s+").unwrap());

/// Parse a single task line: `- [x] [event] Title`.
/// Returns `None` for anything that is not a task line.
pub fn parse_task_line(line: &str) -> Option<MarkdownTask> {
    parse_indented_task_line(line).map(|(_, task)| task)
}

/// Number of leading whitespace characters before the bullet, if this is a
/// task line
pub fn task_line_indent(line: &str) -> Option<usize> {
    parse_indented_task_line(line).map(|(indent, _)| indent)
}

/// Parse a task line together with its indent
pub fn parse_indented_task_line(line: &str) -> Option<(usize, MarkdownTask)> {
    let caps = TASK_LINE.captures(line)?;
    let indent = caps.get(1).map_or(0, |m| m.as_str().chars().count());
    let status = caps
        .get(3)
        .and_then(|m| m.as_str().chars().next())
        .and_then(TaskStatus::from_checkbox_char)?;
    let rest = caps.get(4).map_or("", |m| m.as_str()).trim();
    let (task_type, title) = split_type_marker(rest);

    Some((
        indent,
        MarkdownTask {
            status,
            task_type,
            title: title.to_string(),
        },
    ))
}

/// Strip a leading type marker from a trimmed title
fn split_type_marker(title: &str) -> (TaskType, &str) {
    if let Some(caps) = TYPE_MARKER.captures(title)
        && let (Some(whole), Some(name)) = (caps.get(0), caps.get(1))
        && let Some(task_type) = TaskType::from_marker(name.as_str())
    {
        return (task_type, title[whole.end()..].trim());
    }
    (TaskType::Task, title)
}

/// True if a trimmed title would be read back as carrying a type marker
pub(crate) fn starts_with_type_marker(title: &str) -> bool {
    TYPE_MARKER.is_match(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_task() {
        let task = parse_task_line("- [ ] Grocery run").unwrap();
        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.task_type, TaskType::Task);
        assert_eq!(task.title, "Grocery run");
    }

    #[test]
    fn test_parse_task_statuses() {
        for (ch, expected) in [
            (' ', TaskStatus::Open),
            ('x', TaskStatus::Completed),
            ('>', TaskStatus::Moved),
            ('-', TaskStatus::Cancelled),
            ('?', TaskStatus::Failed),
        ] {
            let task = parse_task_line(&format!("- [{}] Test task", ch)).unwrap();
            assert_eq!(task.status, expected);
        }
    }

    #[test]
    fn test_parse_type_marker() {
        let task = parse_task_line("- [x] [Event] Dentist").unwrap();
        assert_eq!(task.task_type, TaskType::Event);
        assert_eq!(task.title, "Dentist");

        let task = parse_task_line("* [ ] [holiday]   New Year").unwrap();
        assert_eq!(task.task_type, TaskType::Holiday);
        assert_eq!(task.title, "New Year");
    }

    #[test]
    fn test_marker_needs_trailing_space() {
        // A bare marker is just the title
        let task = parse_task_line("- [ ] [birthday]").unwrap();
        assert_eq!(task.task_type, TaskType::Task);
        assert_eq!(task.title, "[birthday]");

        let task = parse_task_line("- [ ] [meeting] Standup").unwrap();
        assert_eq!(task.task_type, TaskType::Task);
        assert_eq!(task.title, "[meeting] Standup");
    }

    #[test]
    fn test_star_bullet_and_indent() {
        let line = "    * [-] Skipped run";
        let task = parse_task_line(line).unwrap();
        assert_eq!(task.status, TaskStatus::Cancelled);
        assert_eq!(task_line_indent(line), Some(4));
        assert_eq!(task_line_indent("- [ ] Top"), Some(0));
    }

    #[test]
    fn test_non_task_lines() {
        for line in [
            "",
            "Just prose",
            "- plain bullet",
            "- [~] Unknown status",
            "- [ ]",
            "-[ ] No space after bullet",
            "  - location: Cafe",
            "### Monday 01/08",
        ] {
            assert_eq!(parse_task_line(line), None, "line: {:?}", line);
            assert_eq!(task_line_indent(line), None, "line: {:?}", line);
        }
    }

    #[test]
    fn test_title_whitespace_is_trimmed() {
        let task = parse_task_line("- [ ]    Coffee   ").unwrap();
        assert_eq!(task.title, "Coffee");
    }
}
