use std::collections::HashMap;

use crate::model::task::Task;
use crate::model::week::{DAYS_PER_WEEK, WeekState};
use crate::parse::task_serializer::serialize_task;
use crate::util::dates::{DAY_NAMES, month_day_label};

/// Line written for a day with no tasks and no groups
pub const EMPTY_DAY_PLACEHOLDER: &str = "- [ ] ...";

/// Indent of task lines under a group header
const GROUP_INDENT: usize = 2;

/// Serialize a week to its markdown document.
///
/// For each day, root tasks come first (by position), then each group with
/// its tasks. Root tasks and groups are never interleaved, whatever their
/// positions say.
pub fn week_state_to_markdown(week: &WeekState) -> String {
    let mut lines: Vec<String> = vec![
        format!("# Week of {}", week.week_start.format("%Y-%m-%d")),
        String::new(),
        "## Days".to_string(),
        String::new(),
    ];

    let group_days: HashMap<&str, u8> = week
        .groups
        .iter()
        .map(|g| (g.id.as_str(), g.day_index))
        .collect();

    for day_index in 0..DAYS_PER_WEEK {
        let day_name = DAY_NAMES[usize::from(day_index)];
        match week.date_for_day(day_index) {
            Some(date) => lines.push(format!("### {} {}", day_name, month_day_label(date))),
            None => lines.push(format!("### {}", day_name)),
        }
        lines.push(String::new());

        // Tasks pointing at a group that does not exist, or that sits on
        // another day, are written as root tasks
        let mut root_tasks: Vec<&Task> = week
            .tasks
            .iter()
            .filter(|t| t.day_index == day_index)
            .filter(|t| match t.group_id.as_deref() {
                None => true,
                Some(gid) => group_days.get(gid) != Some(&day_index),
            })
            .collect();
        root_tasks.sort_by_key(|t| t.position);

        for task in &root_tasks {
            lines.extend(serialize_task(task, 0));
        }

        let groups = week.day_groups(day_index);
        for group in &groups {
            lines.push(String::new());
            lines.push(format!("#### Group: {}", group.title));
            for task in week.group_tasks(&group.id) {
                lines.extend(serialize_task(task, GROUP_INDENT));
            }
        }

        if root_tasks.is_empty() && groups.is_empty() {
            lines.push(EMPTY_DAY_PLACEHOLDER.to_string());
        }

        lines.push(String::new());
    }

    lines.join("\n")
}
