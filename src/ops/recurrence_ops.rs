use chrono::NaiveDate;
use tracing::debug;

use crate::model::recurrence::{RecurrenceBook, RecurrenceRule};
use crate::model::week::WeekState;
use crate::ops::OpsError;

impl RecurrenceBook {
    /// Insert a new rule at the end of the book.
    ///
    /// Rejects a zero interval, an end date before the start date, and an id
    /// that is already taken.
    pub fn add_rule(&mut self, rule: RecurrenceRule) -> Result<(), OpsError> {
        validate_rule(&rule)?;
        if self.rules.contains_key(&rule.id) {
            return Err(OpsError::DuplicateRule(rule.id));
        }
        debug!(rule = %rule.id, frequency = rule.frequency.as_str(), "added recurrence");
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    /// Put `date` on the rule's skip list. Returns false if it was already there.
    pub fn skip_occurrence(&mut self, rule_id: &str, date: NaiveDate) -> bool {
        self.exceptions
            .entry(rule_id.to_string())
            .or_default()
            .skip_dates
            .insert(date)
    }
}

pub fn validate_rule(rule: &RecurrenceRule) -> Result<(), OpsError> {
    if rule.interval == 0 {
        return Err(OpsError::ZeroInterval);
    }
    if let Some(end) = rule.end_date
        && end < rule.start_date
    {
        return Err(OpsError::EndBeforeStart {
            start: rule.start_date,
            end,
        });
    }
    Ok(())
}

/// Remove a rule, its exceptions, and every occurrence of it in `week`
pub fn delete_recurrence_series(
    week: &WeekState,
    book: &RecurrenceBook,
    rule_id: &str,
) -> Result<(WeekState, RecurrenceBook), OpsError> {
    if !book.rules.contains_key(rule_id) {
        return Err(OpsError::RuleNotFound(rule_id.to_string()));
    }

    let mut book = book.clone();
    book.rules.shift_remove(rule_id);
    book.exceptions.shift_remove(rule_id);

    let mut week = week.clone();
    week.tasks.retain(|t| t.recurrence_id.as_deref() != Some(rule_id));

    Ok((week, book))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::recurrence::Frequency;
    use crate::model::task::Task;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_add_rule_keeps_insertion_order() {
        let mut book = RecurrenceBook::default();
        book.add_rule(RecurrenceRule::new("b", "B", Frequency::Day, 1, date("2024-01-01")))
            .unwrap();
        book.add_rule(RecurrenceRule::new("a", "A", Frequency::Day, 1, date("2024-01-01")))
            .unwrap();
        let ids: Vec<&str> = book.rules.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_add_rule_rejects_invalid() {
        let mut book = RecurrenceBook::default();
        let zero = RecurrenceRule::new("z", "Zero", Frequency::Week, 0, date("2024-01-01"));
        assert!(matches!(book.add_rule(zero), Err(OpsError::ZeroInterval)));

        let mut backwards = RecurrenceRule::new("b", "Backwards", Frequency::Day, 1, date("2024-02-01"));
        backwards.end_date = Some(date("2024-01-01"));
        assert!(matches!(
            book.add_rule(backwards),
            Err(OpsError::EndBeforeStart { .. })
        ));

        let ok = RecurrenceRule::new("r", "Ok", Frequency::Day, 1, date("2024-01-01"));
        book.add_rule(ok.clone()).unwrap();
        assert!(matches!(book.add_rule(ok), Err(OpsError::DuplicateRule(id)) if id == "r"));
        assert_eq!(book.rules.len(), 1);
    }

    #[test]
    fn test_same_day_end_is_valid() {
        let mut rule = RecurrenceRule::new("r", "Once", Frequency::Day, 1, date("2024-01-01"));
        rule.end_date = Some(date("2024-01-01"));
        assert!(validate_rule(&rule).is_ok());
    }

    #[test]
    fn test_skip_occurrence_dedups() {
        let mut book = RecurrenceBook::default();
        assert!(book.skip_occurrence("r", date("2024-01-09")));
        assert!(!book.skip_occurrence("r", date("2024-01-09")));
        assert_eq!(book.exceptions["r"].skip_dates.len(), 1);
    }

    #[test]
    fn test_delete_series() {
        let mut book = RecurrenceBook::default();
        book.add_rule(RecurrenceRule::new("r", "Gym", Frequency::Day, 1, date("2024-01-07")))
            .unwrap();
        book.add_rule(RecurrenceRule::new("s", "Read", Frequency::Day, 1, date("2024-01-07")))
            .unwrap();
        book.skip_occurrence("r", date("2024-01-08"));

        let mut week = WeekState::empty(date("2024-01-07")).with_recurrences(&book);
        week.tasks.push(Task::new("plain", "Plain", 0, 5));
        assert_eq!(week.tasks.len(), 6 + 7 + 1);

        let (week, book) = delete_recurrence_series(&week, &book, "r").unwrap();
        assert!(book.rule("r").is_none());
        assert!(!book.exceptions.contains_key("r"));
        assert_eq!(week.tasks.len(), 7 + 1);
        assert!(week.tasks.iter().all(|t| t.recurrence_id.as_deref() != Some("r")));
    }

    #[test]
    fn test_delete_unknown_series() {
        let week = WeekState::empty(date("2024-01-07"));
        let err = delete_recurrence_series(&week, &RecurrenceBook::default(), "nope").unwrap_err();
        assert_eq!(err.to_string(), "recurrence not found: nope");
    }
}
