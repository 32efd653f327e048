use std::collections::BTreeSet;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::task::{TaskLocation, TaskType};

/// How often a rule's interval is counted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Day,
    Week,
    Month,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Day => "day",
            Frequency::Week => "week",
            Frequency::Month => "month",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Frequency::Day),
            "week" | "weekly" => Ok(Frequency::Week),
            "month" | "monthly" => Ok(Frequency::Month),
            _ => Err(format!("unknown frequency: {} (expected day, week or month)", s)),
        }
    }
}

/// A task template plus a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub id: String,
    pub frequency: Frequency,
    /// Every `interval` days/weeks/months, at least 1
    pub interval: u32,
    #[serde(rename = "startDateISO")]
    pub start_date: NaiveDate,
    /// Inclusive last date, if bounded
    #[serde(rename = "endDateISO", default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub title: String,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub goal_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub companion_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links_markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<TaskLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl RecurrenceRule {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        frequency: Frequency,
        interval: u32,
        start_date: NaiveDate,
    ) -> Self {
        RecurrenceRule {
            id: id.into(),
            frequency,
            interval,
            start_date,
            end_date: None,
            title: title.into(),
            task_type: TaskType::Task,
            goal_ids: Vec::new(),
            companion_ids: Vec::new(),
            links_markdown: None,
            location: None,
            notes_markdown: None,
            group_id: None,
        }
    }

    /// The group occurrences go into; an empty id means the day root
    pub fn target_group(&self) -> Option<&str> {
        self.group_id.as_deref().filter(|g| !g.is_empty())
    }
}

/// Dates on which a rule must never produce an occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceException {
    #[serde(rename = "skipDatesISO", default)]
    pub skip_dates: BTreeSet<NaiveDate>,
}

impl RecurrenceException {
    pub fn skips(&self, date: NaiveDate) -> bool {
        self.skip_dates.contains(&date)
    }
}

/// All rules and their exception lists, keyed by rule id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceBook {
    #[serde(default)]
    pub rules: IndexMap<String, RecurrenceRule>,
    #[serde(default)]
    pub exceptions: IndexMap<String, RecurrenceException>,
}

impl RecurrenceBook {
    pub fn rule(&self, id: &str) -> Option<&RecurrenceRule> {
        self.rules.get(id)
    }

    /// True when `date` is on the rule's skip list
    pub fn is_skipped(&self, rule_id: &str, date: NaiveDate) -> bool {
        self.exceptions
            .get(rule_id)
            .is_some_and(|ex| ex.skips(date))
    }
}
