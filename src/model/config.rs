use serde::{Deserialize, Serialize};

/// Configuration from planner.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub planner: PlannerInfo,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub expand: ExpandConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerInfo {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per week, relative to planner/
    #[serde(default = "default_weeks_dir")]
    pub weeks_dir: String,
    /// Rules and exceptions file, relative to planner/
    #[serde(default = "default_recurrences_file")]
    pub recurrences_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            weeks_dir: default_weeks_dir(),
            recurrences_file: default_recurrences_file(),
        }
    }
}

fn default_weeks_dir() -> String {
    "weeks".to_string()
}

fn default_recurrences_file() -> String {
    "recurrences.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Drop the `- [ ] ...` empty-day placeholder when importing
    #[serde(default = "default_true")]
    pub skip_placeholders: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        MarkdownConfig {
            skip_placeholders: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandConfig {
    /// Materialize recurring occurrences whenever a week is shown or exported
    #[serde(default = "default_true")]
    pub on_show: bool,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        ExpandConfig { on_show: true }
    }
}

fn default_true() -> bool {
    true
}
