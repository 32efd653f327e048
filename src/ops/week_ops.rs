use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::model::recurrence::RecurrenceBook;
use crate::model::task::{Task, TaskStatus};
use crate::model::week::{DAYS_PER_WEEK, WeekState};
use crate::ops::OpsError;

/// Remove a task from the week.
///
/// When the task is a recurring occurrence its date also goes on the rule's
/// skip list, so expanding the week again will not bring it back.
pub fn delete_task_occurrence(
    week: &WeekState,
    book: &RecurrenceBook,
    task_id: &str,
) -> Result<(WeekState, RecurrenceBook), OpsError> {
    let task = week
        .task(task_id)
        .ok_or_else(|| OpsError::TaskNotFound(task_id.to_string()))?;

    let mut book = book.clone();
    if let Some((rule_id, date)) = task.occurrence_key() {
        book.skip_occurrence(rule_id, date);
        debug!(rule = %rule_id, %date, "skipping occurrence");
    }

    let mut week = week.clone();
    week.tasks.retain(|t| t.id != task_id);
    Ok((week, book))
}

/// Remove every task and group on `day_index`, skipping its occurrences
pub fn clear_day(
    week: &WeekState,
    book: &RecurrenceBook,
    day_index: u8,
) -> Result<(WeekState, RecurrenceBook), OpsError> {
    if day_index >= DAYS_PER_WEEK {
        return Err(OpsError::InvalidDay(day_index));
    }

    let mut book = book.clone();
    for task in week.tasks.iter().filter(|t| t.day_index == day_index) {
        if let Some((rule_id, date)) = task.occurrence_key() {
            book.skip_occurrence(rule_id, date);
        }
    }

    let mut week = week.clone();
    week.tasks.retain(|t| t.day_index != day_index);
    week.groups.retain(|g| g.day_index != day_index);
    Ok((week, book))
}

/// Remove every task and group of the week, skipping all of its occurrences
pub fn clear_week(week: &WeekState, book: &RecurrenceBook) -> (WeekState, RecurrenceBook) {
    let mut book = book.clone();
    for (rule_id, date) in week.tasks.iter().filter_map(Task::occurrence_key) {
        book.skip_occurrence(rule_id, date);
    }
    (WeekState::empty(week.week_start), book)
}

/// Set the status of one task
pub fn set_task_status(
    week: &WeekState,
    task_id: &str,
    status: TaskStatus,
) -> Result<WeekState, OpsError> {
    let mut week = week.clone();
    let task = week
        .tasks
        .iter_mut()
        .find(|t| t.id == task_id)
        .ok_or_else(|| OpsError::TaskNotFound(task_id.to_string()))?;
    task.status = status;
    Ok(week)
}

/// Give a week freshly parsed from markdown the identity it had in storage.
///
/// Markdown carries no ids, so every parsed group and task is new. A parsed
/// group matching a stored group (same day and title) takes back the stored
/// id. A parsed task matching a stored occurrence (same day, group title,
/// type and title) takes back its id, `recurrence_id` and `occurrence_date`,
/// so expanding the week afterwards does not materialize it a second time.
/// Status, position and location always come from the parsed week.
pub fn adopt_stored_identity(parsed: &WeekState, stored: &WeekState) -> WeekState {
    let mut week = parsed.clone();

    let mut claimed_groups: HashSet<&str> = HashSet::new();
    let mut renamed: HashMap<String, String> = HashMap::new();
    for group in &mut week.groups {
        let Some(old) = stored.groups.iter().find(|g| {
            g.day_index == group.day_index
                && g.title == group.title
                && !claimed_groups.contains(g.id.as_str())
        }) else {
            continue;
        };
        claimed_groups.insert(old.id.as_str());
        renamed.insert(std::mem::replace(&mut group.id, old.id.clone()), old.id.clone());
    }

    let group_titles: HashMap<&str, (u8, &str)> = week
        .groups
        .iter()
        .map(|g| (g.id.as_str(), (g.day_index, g.title.as_str())))
        .collect();

    let mut adopted: Vec<Task> = Vec::with_capacity(week.tasks.len());
    let mut claimed: HashSet<&str> = HashSet::new();
    for task in &week.tasks {
        let mut task = task.clone();
        if let Some(gid) = task.group_id.take() {
            task.group_id = Some(renamed.get(&gid).cloned().unwrap_or(gid));
        }

        if task.occurrence_key().is_none() {
            let context = group_context(&group_titles, &task);
            let found = stored.tasks.iter().find(|s| {
                s.occurrence_key().is_some()
                    && !claimed.contains(s.id.as_str())
                    && s.day_index == task.day_index
                    && s.task_type == task.task_type
                    && s.title.trim() == task.title.trim()
                    && stored_group_context(stored, s) == context
            });
            if let Some(occurrence) = found {
                claimed.insert(occurrence.id.as_str());
                debug!(id = %occurrence.id, "matched imported task to stored occurrence");
                task.id = occurrence.id.clone();
                task.recurrence_id = occurrence.recurrence_id.clone();
                task.occurrence_date = occurrence.occurrence_date;
            }
        }
        adopted.push(task);
    }

    week.tasks = adopted;
    week
}

/// Title of the group a task is written under, `None` at the day root
fn group_context<'a>(groups: &HashMap<&str, (u8, &'a str)>, task: &Task) -> Option<&'a str> {
    let gid = task.group_id.as_deref()?;
    let &(day_index, title) = groups.get(gid)?;
    (day_index == task.day_index).then_some(title)
}

fn stored_group_context<'a>(week: &'a WeekState, task: &Task) -> Option<&'a str> {
    let group = week.group(task.group_id.as_deref()?)?;
    (group.day_index == task.day_index).then_some(group.title.as_str())
}

/// Open, completed and failed counts. Cancelled and moved tasks are not
/// counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub open: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.open + self.completed + self.failed
    }

    fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Open => self.open += 1,
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::Failed => self.failed += 1,
            TaskStatus::Cancelled | TaskStatus::Moved => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekStats {
    pub total: StatusCounts,
    /// Indexed by day, Sunday first
    pub by_day: [StatusCounts; DAYS_PER_WEEK as usize],
}

/// Count task statuses per day and for the whole week. Tasks on a day
/// outside the week are ignored.
pub fn week_stats(week: &WeekState) -> WeekStats {
    let mut stats = WeekStats::default();
    for task in &week.tasks {
        let Some(day) = stats.by_day.get_mut(usize::from(task.day_index)) else {
            continue;
        };
        day.record(task.status);
        stats.total.record(task.status);
    }
    stats
}

/// Remove a group and the tasks inside it. Unknown ids leave the week as is.
pub fn delete_group(week: &WeekState, group_id: &str) -> WeekState {
    let mut week = week.clone();
    week.groups.retain(|g| g.id != group_id);
    week.tasks.retain(|t| t.group_id.as_deref() != Some(group_id));
    week
}
