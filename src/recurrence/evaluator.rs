use chrono::{Datelike, NaiveDate};

use crate::model::recurrence::{Frequency, RecurrenceRule};
use crate::util::dates::last_day_of_month;

/// Does `rule` produce an occurrence on `date`?
///
/// Bounds are inclusive. Monthly rules anchored past the end of a shorter
/// month fire on that month's last day (a rule starting Jan 31 fires on
/// Feb 29 in a leap year, Apr 30, and so on).
pub fn occurs_on_date(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    let start = rule.start_date;
    if date < start {
        return false;
    }
    if rule.end_date.is_some_and(|end| date > end) {
        return false;
    }

    let interval = i64::from(rule.interval.max(1));
    let days = (date - start).num_days();

    match rule.frequency {
        Frequency::Day => days % interval == 0,
        Frequency::Week => {
            date.weekday() == start.weekday() && (days / 7) % interval == 0
        }
        Frequency::Month => {
            let months = i64::from(date.year() - start.year()) * 12
                + i64::from(date.month()) - i64::from(start.month());
            if months % interval != 0 {
                return false;
            }
            if date.day() == start.day() {
                return true;
            }
            let last_day = last_day_of_month(date.year(), date.month());
            date.day() == last_day && start.day() > last_day
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rule(frequency: Frequency, interval: u32, start: &str) -> RecurrenceRule {
        RecurrenceRule::new("r", "Recurring", frequency, interval, date(start))
    }

    #[test]
    fn test_daily_interval() {
        let r = rule(Frequency::Day, 3, "2024-01-01");
        assert!(occurs_on_date(&r, date("2024-01-01")));
        assert!(!occurs_on_date(&r, date("2024-01-02")));
        assert!(occurs_on_date(&r, date("2024-01-04")));
        assert!(occurs_on_date(&r, date("2024-03-01")));
        assert!(!occurs_on_date(&r, date("2023-12-29")));
    }

    #[test]
    fn test_biweekly() {
        let r = rule(Frequency::Week, 2, "2024-01-07");
        assert!(occurs_on_date(&r, date("2024-01-07")));
        assert!(!occurs_on_date(&r, date("2024-01-14")));
        assert!(occurs_on_date(&r, date("2024-01-21")));
        // Right interval, wrong weekday
        assert!(!occurs_on_date(&r, date("2024-01-22")));
    }

    #[test]
    fn test_monthly_clamping() {
        let r = rule(Frequency::Month, 1, "2024-01-31");
        assert!(occurs_on_date(&r, date("2024-02-29")));
        assert!(occurs_on_date(&r, date("2024-03-31")));
        assert!(!occurs_on_date(&r, date("2024-03-30")));
        assert!(occurs_on_date(&r, date("2024-04-30")));
        assert!(occurs_on_date(&r, date("2025-02-28")));
        assert!(!occurs_on_date(&r, date("2024-02-28")));
    }

    #[test]
    fn test_monthly_interval() {
        let r = rule(Frequency::Month, 3, "2024-01-15");
        assert!(occurs_on_date(&r, date("2024-04-15")));
        assert!(!occurs_on_date(&r, date("2024-02-15")));
        assert!(occurs_on_date(&r, date("2025-01-15")));
        assert!(!occurs_on_date(&r, date("2024-04-16")));
    }

    #[test]
    fn test_end_date_is_inclusive() {
        let mut r = rule(Frequency::Day, 1, "2024-01-01");
        r.end_date = Some(date("2024-01-10"));
        assert!(occurs_on_date(&r, date("2024-01-10")));
        assert!(!occurs_on_date(&r, date("2024-01-11")));
    }

    #[test]
    fn test_zero_interval_behaves_like_one() {
        let r = rule(Frequency::Day, 0, "2024-01-01");
        assert!(occurs_on_date(&r, date("2024-01-02")));
    }
}
