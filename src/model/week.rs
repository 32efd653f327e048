use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::task::Task;
use crate::util::dates::sunday_on_or_before;

/// Days in a planner week
pub const DAYS_PER_WEEK: u8 = 7;

/// A named container of tasks on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub title: String,
    pub day_index: u8,
    /// Order within the day, relative to other groups and root tasks
    #[serde(default)]
    pub position: u32,
}

impl Group {
    pub fn new(id: impl Into<String>, title: impl Into<String>, day_index: u8, position: u32) -> Self {
        Group {
            id: id.into(),
            title: title.into(),
            day_index,
            position,
        }
    }
}

/// One week of tasks and groups, the unit of persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekState {
    /// Always a Sunday
    pub week_start: NaiveDate,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl WeekState {
    /// An empty week containing `date`
    pub fn empty(date: NaiveDate) -> Self {
        WeekState {
            week_start: sunday_on_or_before(date),
            tasks: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Calendar date of `day_index` within this week. `None` past the end
    /// of the calendar.
    pub fn date_for_day(&self, day_index: u8) -> Option<NaiveDate> {
        self.week_start.checked_add_days(Days::new(u64::from(day_index)))
    }

    /// Day index of `date`, if it falls inside this week
    pub fn day_index_of(&self, date: NaiveDate) -> Option<u8> {
        let offset = (date - self.week_start).num_days();
        if (0..i64::from(DAYS_PER_WEEK)).contains(&offset) {
            u8::try_from(offset).ok()
        } else {
            None
        }
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Root tasks of a day, in position order
    pub fn root_tasks(&self, day_index: u8) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.day_index == day_index && t.group_id.is_none())
            .collect();
        tasks.sort_by_key(|t| t.position);
        tasks
    }

    /// Groups of a day, in position order
    pub fn day_groups(&self, day_index: u8) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self
            .groups
            .iter()
            .filter(|g| g.day_index == day_index)
            .collect();
        groups.sort_by_key(|g| g.position);
        groups
    }

    /// Tasks belonging to a group, in position order. A task whose day
    /// differs from its group's day is not in the group.
    pub fn group_tasks(&self, group_id: &str) -> Vec<&Task> {
        let group_day = self.group(group_id).map(|g| g.day_index);
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.group_id.as_deref() == Some(group_id))
            .filter(|t| group_day.is_none_or(|day| t.day_index == day))
            .collect();
        tasks.sort_by_key(|t| t.position);
        tasks
    }
}
