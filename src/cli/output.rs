use chrono::NaiveDate;
use serde::Serialize;

use crate::model::recurrence::{RecurrenceBook, RecurrenceRule};
use crate::model::task::TaskType;
use crate::ops::week_ops::{StatusCounts, WeekStats};
use crate::util::dates::{DAY_NAMES, day_index_from_name, parse_iso_date};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct RuleJson<'a> {
    #[serde(flatten)]
    pub rule: &'a RecurrenceRule,
    #[serde(rename = "skipDatesISO", skip_serializing_if = "Vec::is_empty")]
    pub skip_dates: Vec<NaiveDate>,
}

#[derive(Serialize)]
pub struct OccursJson<'a> {
    pub id: &'a str,
    pub date: NaiveDate,
    pub occurs: bool,
    pub skipped: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWeekJson {
    pub week_start: NaiveDate,
    pub path: String,
}

#[derive(Serialize)]
pub struct StatusCountsJson {
    pub open: usize,
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStatsJson {
    pub day_index: usize,
    pub label: &'static str,
    #[serde(flatten)]
    pub counts: StatusCountsJson,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekStatsJson {
    pub week_start: NaiveDate,
    pub total: StatusCountsJson,
    pub by_day: Vec<DayStatsJson>,
}

pub fn counts_to_json(counts: &StatusCounts) -> StatusCountsJson {
    StatusCountsJson {
        open: counts.open,
        completed: counts.completed,
        failed: counts.failed,
        total: counts.total(),
    }
}

pub fn stats_to_json(week_start: NaiveDate, stats: &WeekStats) -> WeekStatsJson {
    WeekStatsJson {
        week_start,
        total: counts_to_json(&stats.total),
        by_day: stats
            .by_day
            .iter()
            .enumerate()
            .map(|(day_index, counts)| DayStatsJson {
                day_index,
                label: DAY_NAMES[day_index],
                counts: counts_to_json(counts),
            })
            .collect(),
    }
}

pub fn rules_to_json(book: &RecurrenceBook) -> Vec<RuleJson<'_>> {
    book.rules
        .values()
        .map(|rule| RuleJson {
            rule,
            skip_dates: book
                .exceptions
                .get(&rule.id)
                .map(|ex| ex.skip_dates.iter().copied().collect())
                .unwrap_or_default(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// "every 2 weeks", "every day"
pub fn format_schedule(rule: &RecurrenceRule) -> String {
    let unit = rule.frequency.as_str();
    if rule.interval <= 1 {
        format!("every {}", unit)
    } else {
        format!("every {} {}s", rule.interval, unit)
    }
}

/// One line per rule for `recur list`
pub fn format_rule_line(rule: &RecurrenceRule, skipped: usize) -> String {
    let type_str = if rule.task_type == TaskType::Task {
        String::new()
    } else {
        format!("[{}] ", rule.task_type.as_str())
    };
    let mut line = format!(
        "{}  {}{}  ({} from {}",
        rule.id,
        type_str,
        rule.title,
        format_schedule(rule),
        rule.start_date.format("%Y-%m-%d")
    );
    if let Some(end) = rule.end_date {
        line.push_str(&format!(" until {}", end.format("%Y-%m-%d")));
    }
    line.push(')');
    if skipped > 0 {
        line.push_str(&format!(" [{} skipped]", skipped));
    }
    line
}

/// "2 / 5 completed, 1 / 5 failed, 2 / 5 open"
fn format_counts(counts: &StatusCounts) -> String {
    let total = counts.total();
    format!(
        "{} / {} completed, {} / {} failed, {} / {} open",
        counts.completed, total, counts.failed, total, counts.open, total
    )
}

/// Week summary for `stats`: a total line, then one line per day
pub fn format_week_stats(week_start: NaiveDate, stats: &WeekStats) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Week of {}: {}",
            week_start.format("%Y-%m-%d"),
            format_counts(&stats.total)
        ),
        String::new(),
    ];
    for (name, counts) in DAY_NAMES.iter().zip(&stats.by_day) {
        if counts.total() == 0 {
            lines.push(format!("{:<10} no tasks", name));
        } else {
            lines.push(format!("{:<10} {}", name, format_counts(counts)));
        }
    }
    lines
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

/// Parse a YYYY-MM-DD argument
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_iso_date(s).ok_or_else(|| format!("invalid date '{}' (expected YYYY-MM-DD)", s))
}

/// Parse a day name or a 0-6 index
pub fn parse_day_arg(s: &str) -> Result<u8, String> {
    if let Ok(index) = s.parse::<u8>()
        && usize::from(index) < DAY_NAMES.len()
    {
        return Ok(index);
    }
    let capitalized: String = s
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect();
    day_index_from_name(&capitalized)
        .ok_or_else(|| format!("unknown day '{}' (expected Sunday..Saturday or 0-6)", s))
}
