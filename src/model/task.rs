use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task checkbox state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Open,
    Completed,
    Cancelled,
    Failed,
    Moved,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Open,
        TaskStatus::Completed,
        TaskStatus::Moved,
        TaskStatus::Cancelled,
        TaskStatus::Failed,
    ];

    /// The character used inside the checkbox `[ ]`
    pub fn checkbox_char(self) -> char {
        match self {
            TaskStatus::Open => ' ',
            TaskStatus::Completed => 'x',
            TaskStatus::Moved => '>',
            TaskStatus::Cancelled => '-',
            TaskStatus::Failed => '?',
        }
    }

    /// Parse a checkbox character into a status
    pub fn from_checkbox_char(c: char) -> Option<TaskStatus> {
        match c {
            ' ' => Some(TaskStatus::Open),
            'x' => Some(TaskStatus::Completed),
            '>' => Some(TaskStatus::Moved),
            '-' => Some(TaskStatus::Cancelled),
            '?' => Some(TaskStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Failed => "failed",
            TaskStatus::Moved => "moved",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown status: {} (expected open, completed, moved, cancelled or failed)", s)
            })
    }
}

/// What kind of weekly item a task is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Task,
    Event,
    Birthday,
    Holiday,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Task => "task",
            TaskType::Event => "event",
            TaskType::Birthday => "birthday",
            TaskType::Holiday => "holiday",
        }
    }

    /// Case-insensitive lookup of a type marker name (`event`, `Holiday`, ...)
    pub fn from_marker(name: &str) -> Option<TaskType> {
        match name.to_ascii_lowercase().as_str() {
            "task" => Some(TaskType::Task),
            "event" => Some(TaskType::Event),
            "birthday" => Some(TaskType::Birthday),
            "holiday" => Some(TaskType::Holiday),
            _ => None,
        }
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::from_marker(s).ok_or_else(|| format!("unknown task type: {}", s))
    }
}

/// The only geocoding provider location records come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationProvider {
    #[default]
    Nominatim,
}

/// A place attached to a task. Everything beyond `label` and `map_url` is
/// filled in by the geocoder and carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLocation {
    pub label: String,
    #[serde(default)]
    pub map_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default)]
    pub provider: LocationProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominatim: Option<serde_json::Value>,
}

impl TaskLocation {
    pub fn new(label: impl Into<String>, map_url: impl Into<String>) -> Self {
        TaskLocation {
            label: label.into(),
            map_url: map_url.into(),
            lat: None,
            lng: None,
            provider: LocationProvider::Nominatim,
            nominatim: None,
        }
    }
}

/// The part of a task a single markdown line carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownTask {
    pub status: TaskStatus,
    pub task_type: TaskType,
    pub title: String,
}

impl MarkdownTask {
    pub fn new(status: TaskStatus, task_type: TaskType, title: impl Into<String>) -> Self {
        MarkdownTask {
            status,
            task_type,
            title: title.into(),
        }
    }
}

/// A task placed on one day of a week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// 0 = Sunday ... 6 = Saturday
    pub day_index: u8,
    /// Order within the day, or within the group when `group_id` is set
    #[serde(default)]
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<TaskLocation>,
    /// Set on materialized occurrences of a recurrence rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<String>,
    #[serde(
        rename = "occurrenceDateISO",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub occurrence_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub goal_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub companion_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links_markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_markdown: Option<String>,
}

impl Task {
    /// Create an open root task of type `task`
    pub fn new(id: impl Into<String>, title: impl Into<String>, day_index: u8, position: u32) -> Self {
        Task {
            id: id.into(),
            task_type: TaskType::Task,
            title: title.into(),
            status: TaskStatus::Open,
            day_index,
            position,
            group_id: None,
            location: None,
            recurrence_id: None,
            occurrence_date: None,
            goal_ids: Vec::new(),
            companion_ids: Vec::new(),
            links_markdown: None,
            notes_markdown: None,
        }
    }

    /// The line-level view of this task
    pub fn markdown(&self) -> MarkdownTask {
        MarkdownTask::new(self.status, self.task_type, self.title.clone())
    }

    /// `(recurrence_id, occurrence_date)` when this task is an occurrence
    pub fn occurrence_key(&self) -> Option<(&str, NaiveDate)> {
        match (&self.recurrence_id, self.occurrence_date) {
            (Some(rid), Some(date)) => Some((rid.as_str(), date)),
            _ => None,
        }
    }

    /// True when this task sits in the given `(day, group)` ordering context
    pub fn in_context(&self, day_index: u8, group_id: Option<&str>) -> bool {
        self.day_index == day_index && self.group_id.as_deref() == group_id
    }
}
