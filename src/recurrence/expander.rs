use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use indexmap::IndexMap;
use tracing::debug;

use crate::model::recurrence::{RecurrenceBook, RecurrenceException, RecurrenceRule};
use crate::model::task::{Task, TaskStatus};
use crate::model::week::{DAYS_PER_WEEK, WeekState};
use crate::recurrence::evaluator::occurs_on_date;

/// Deterministic id of the occurrence of `rule_id` on `date`
pub fn occurrence_id(rule_id: &str, date: NaiveDate) -> String {
    format!("occ-{}-{}", rule_id, date.format("%Y-%m-%d"))
}

/// Materialize every missing occurrence of `rules` in the week starting at
/// `week_start`.
///
/// Existing tasks are returned untouched, followed by the new occurrences.
/// An occurrence already present (same rule id and date) or listed in the
/// rule's exceptions is never created, so running this on its own output
/// adds nothing.
pub fn apply_recurrences_to_week(
    week_start: NaiveDate,
    existing: &[Task],
    rules: &IndexMap<String, RecurrenceRule>,
    exceptions: &IndexMap<String, RecurrenceException>,
) -> Vec<Task> {
    let mut tasks = existing.to_vec();
    let mut present: HashSet<(String, NaiveDate)> = existing
        .iter()
        .filter_map(|t| t.occurrence_key())
        .map(|(rid, date)| (rid.to_string(), date))
        .collect();

    for day_index in 0..DAYS_PER_WEEK {
        let Some(date) = week_start.checked_add_days(Days::new(u64::from(day_index))) else {
            break;
        };

        for (rule_id, rule) in rules {
            if !occurs_on_date(rule, date) {
                continue;
            }
            if exceptions.get(rule_id).is_some_and(|ex| ex.skips(date)) {
                continue;
            }
            if !present.insert((rule_id.clone(), date)) {
                continue;
            }

            let position = next_position(&tasks, day_index, rule.target_group());
            let task = synthesize_occurrence(rule_id, rule, date, day_index, position);
            debug!(rule = %rule_id, %date, position, "materialized occurrence");
            tasks.push(task);
        }
    }

    tasks
}

/// One past the highest position in the `(day, group)` context, 0 if empty
fn next_position(tasks: &[Task], day_index: u8, group_id: Option<&str>) -> u32 {
    tasks
        .iter()
        .filter(|t| t.in_context(day_index, group_id))
        .map(|t| t.position.saturating_add(1))
        .max()
        .unwrap_or(0)
}

fn synthesize_occurrence(
    rule_id: &str,
    rule: &RecurrenceRule,
    date: NaiveDate,
    day_index: u8,
    position: u32,
) -> Task {
    Task {
        id: occurrence_id(rule_id, date),
        task_type: rule.task_type,
        title: rule.title.clone(),
        status: TaskStatus::Open,
        day_index,
        position,
        group_id: rule.target_group().map(str::to_string),
        location: rule.location.clone(),
        recurrence_id: Some(rule_id.to_string()),
        occurrence_date: Some(date),
        goal_ids: rule.goal_ids.clone(),
        companion_ids: rule.companion_ids.clone(),
        links_markdown: rule.links_markdown.clone(),
        notes_markdown: rule.notes_markdown.clone(),
    }
}

impl WeekState {
    /// This week with all missing occurrences from `book` filled in
    pub fn with_recurrences(&self, book: &RecurrenceBook) -> WeekState {
        WeekState {
            week_start: self.week_start,
            tasks: apply_recurrences_to_week(self.week_start, &self.tasks, &book.rules, &book.exceptions),
            groups: self.groups.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::recurrence::Frequency;
    use crate::model::task::{TaskLocation, TaskType};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rules(list: Vec<RecurrenceRule>) -> IndexMap<String, RecurrenceRule> {
        list.into_iter().map(|r| (r.id.clone(), r)).collect()
    }

    #[test]
    fn test_daily_rule_fills_week() {
        let rules = rules(vec![RecurrenceRule::new("walk", "Walk", Frequency::Day, 1, date("2024-01-01"))]);
        let tasks = apply_recurrences_to_week(date("2024-01-07"), &[], &rules, &IndexMap::new());

        assert_eq!(tasks.len(), 7);
        assert_eq!(tasks[0].id, "occ-walk-2024-01-07");
        assert_eq!(tasks[6].occurrence_date, Some(date("2024-01-13")));
        assert!(tasks.iter().enumerate().all(|(i, t)| usize::from(t.day_index) == i));
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Open && t.position == 0));
    }

    #[test]
    fn test_template_fields_are_copied() {
        let mut rule = RecurrenceRule::new("bday", "Ana", Frequency::Month, 12, date("2020-01-09"));
        rule.task_type = TaskType::Birthday;
        rule.goal_ids = vec!["g1".into()];
        rule.location = Some(TaskLocation::new("Home", ""));
        rule.notes_markdown = Some("Bring cake".into());
        rule.group_id = Some("grp".into());

        let tasks = apply_recurrences_to_week(date("2024-01-07"), &[], &rules(vec![rule]), &IndexMap::new());
        assert_eq!(tasks.len(), 1);
        let occ = &tasks[0];
        assert_eq!(occ.day_index, 2);
        assert_eq!(occ.task_type, TaskType::Birthday);
        assert_eq!(occ.goal_ids, vec!["g1".to_string()]);
        assert_eq!(occ.location, Some(TaskLocation::new("Home", "")));
        assert_eq!(occ.notes_markdown.as_deref(), Some("Bring cake"));
        assert_eq!(occ.group_id.as_deref(), Some("grp"));
        assert_eq!(occ.recurrence_id.as_deref(), Some("bday"));
    }

    #[test]
    fn test_positions_follow_existing_context() {
        let mut existing = vec![Task::new("a", "Existing", 1, 4)];
        let mut grouped = Task::new("b", "Grouped", 1, 9);
        grouped.group_id = Some("g".into());
        existing.push(grouped);

        let rules = rules(vec![
            RecurrenceRule::new("r1", "First", Frequency::Week, 1, date("2024-01-01")),
            RecurrenceRule::new("r2", "Second", Frequency::Week, 1, date("2024-01-01")),
        ]);
        let tasks = apply_recurrences_to_week(date("2024-01-07"), &existing, &rules, &IndexMap::new());

        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[2].position, 5);
        assert_eq!(tasks[3].position, 6);
        assert_eq!(&tasks[..2], &existing[..]);
    }

    #[test]
    fn test_exceptions_and_existing_occurrences_are_skipped() {
        let rules = rules(vec![RecurrenceRule::new("r", "Daily", Frequency::Day, 1, date("2024-01-07"))]);
        let mut exceptions = IndexMap::new();
        exceptions.insert(
            "r".to_string(),
            RecurrenceException {
                skip_dates: [date("2024-01-08")].into_iter().collect(),
            },
        );
        let mut done = Task::new("kept", "Daily", 0, 0);
        done.recurrence_id = Some("r".into());
        done.occurrence_date = Some(date("2024-01-07"));
        done.status = TaskStatus::Completed;

        let tasks = apply_recurrences_to_week(date("2024-01-07"), &[done], &rules, &exceptions);
        let dates: Vec<NaiveDate> = tasks.iter().filter_map(|t| t.occurrence_date).collect();
        assert_eq!(tasks.len(), 6);
        assert!(!dates.contains(&date("2024-01-08")));
        assert_eq!(tasks[0].status, TaskStatus::Completed);
    }

    #[test]
    fn test_stops_at_the_end_of_the_calendar() {
        let week_start = crate::util::dates::sunday_on_or_before(NaiveDate::MAX);
        let rules = rules(vec![RecurrenceRule::new("r", "Daily", Frequency::Day, 1, week_start)]);
        let tasks = apply_recurrences_to_week(week_start, &[], &rules, &IndexMap::new());
        let last = tasks.iter().filter_map(|t| t.occurrence_date).max();
        assert_eq!(last, Some(NaiveDate::MAX));
    }

    #[test]
    fn test_idempotent() {
        let rules = rules(vec![
            RecurrenceRule::new("d", "Daily", Frequency::Day, 2, date("2024-01-01")),
            RecurrenceRule::new("m", "Monthly", Frequency::Month, 1, date("2023-12-31")),
        ]);
        let once = apply_recurrences_to_week(date("2024-01-28"), &[], &rules, &IndexMap::new());
        let twice = apply_recurrences_to_week(date("2024-01-28"), &once, &rules, &IndexMap::new());
        assert_eq!(once, twice);
        // Anchored on the 31st, so January gets one
        assert!(once.iter().any(|t| t.id == "occ-m-2024-01-31"));
    }

    #[test]
    fn test_empty_group_id_means_root() {
        let mut rule = RecurrenceRule::new("r", "Root", Frequency::Day, 1, date("2024-01-07"));
        rule.group_id = Some(String::new());
        let tasks = apply_recurrences_to_week(date("2024-01-07"), &[], &rules(vec![rule]), &IndexMap::new());
        assert!(tasks.iter().all(|t| t.group_id.is_none()));
    }

    #[test]
    fn test_with_recurrences_keeps_groups() {
        let mut book = RecurrenceBook::default();
        book.rules.insert(
            "r".into(),
            RecurrenceRule::new("r", "Weekly", Frequency::Week, 1, date("2024-01-03")),
        );
        let mut week = WeekState::empty(date("2024-01-07"));
        week.groups.push(crate::model::week::Group::new("g", "G", 0, 0));

        let expanded = week.with_recurrences(&book);
        assert_eq!(expanded.groups, week.groups);
        assert_eq!(expanded.tasks.len(), 1);
        assert_eq!(expanded.tasks[0].day_index, 3);
        assert!(week.tasks.is_empty());
    }
}
