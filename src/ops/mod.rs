pub mod recurrence_ops;
pub mod week_ops;

use chrono::NaiveDate;

/// Error type for planner edits
#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("recurrence not found: {0}")]
    RuleNotFound(String),
    #[error("recurrence already exists: {0}")]
    DuplicateRule(String),
    #[error("interval must be at least 1")]
    ZeroInterval,
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("day index out of range: {0} (expected 0-6)")]
    InvalidDay(u8),
}
