use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::io::config_io::{self, CONFIG_FILE};
use crate::model::config::PlannerConfig;
use crate::model::recurrence::RecurrenceBook;
use crate::model::week::WeekState;
use crate::util::dates::sunday_on_or_before;

/// Directory under the planner root holding all planner files
pub const PLANNER_DIR: &str = "planner";

/// Error type for planner I/O operations
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("not a planner: no planner/planner.toml found")]
    NotAPlanner,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse planner.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("invalid JSON in {path}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Discover the planner by walking up from the given directory, looking for
/// `planner/planner.toml`.
pub fn discover_planner(start: &Path) -> Result<PathBuf, PlannerError> {
    let mut current = start.to_path_buf();
    loop {
        let planner_dir = current.join(PLANNER_DIR);
        if planner_dir.is_dir() && planner_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(PlannerError::NotAPlanner);
        }
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// An opened planner directory and its configuration
#[derive(Debug, Clone)]
pub struct Planner {
    pub root: PathBuf,
    pub planner_dir: PathBuf,
    pub config: PlannerConfig,
}

impl Planner {
    /// Open the planner rooted at `root` (the parent of `planner/`)
    pub fn open(root: &Path) -> Result<Planner, PlannerError> {
        let planner_dir = root.join(PLANNER_DIR);
        if !planner_dir.is_dir() {
            return Err(PlannerError::NotAPlanner);
        }
        let config = config_io::read_config(&planner_dir)?;
        debug!(root = %root.display(), name = %config.planner.name, "opened planner");
        Ok(Planner {
            root: root.to_path_buf(),
            planner_dir,
            config,
        })
    }

    pub fn weeks_dir(&self) -> PathBuf {
        self.planner_dir.join(&self.config.storage.weeks_dir)
    }

    /// File holding the week that contains `date`
    pub fn week_path(&self, date: NaiveDate) -> PathBuf {
        let week_start = sunday_on_or_before(date);
        self.weeks_dir()
            .join(format!("{}.json", week_start.format("%Y-%m-%d")))
    }

    pub fn recurrences_path(&self) -> PathBuf {
        self.planner_dir.join(&self.config.storage.recurrences_file)
    }

    /// Load the week containing `date`. A week never saved is empty.
    pub fn load_week(&self, date: NaiveDate) -> Result<WeekState, PlannerError> {
        let path = self.week_path(date);
        let Some(mut week) = read_json::<WeekState>(&path)? else {
            return Ok(WeekState::empty(date));
        };
        let expected = sunday_on_or_before(date);
        if week.week_start != expected {
            warn!(
                path = %path.display(),
                stored = %week.week_start,
                %expected,
                "week file disagrees with its name, using the file name"
            );
            week.week_start = expected;
        }
        Ok(week)
    }

    pub fn save_week(&self, week: &WeekState) -> Result<(), PlannerError> {
        let path = self.week_path(week.week_start);
        write_json(&path, week)?;
        info!(path = %path.display(), tasks = week.tasks.len(), "saved week");
        Ok(())
    }

    /// Load rules and exceptions. A missing file is an empty book.
    pub fn load_recurrences(&self) -> Result<RecurrenceBook, PlannerError> {
        Ok(read_json(&self.recurrences_path())?.unwrap_or_default())
    }

    pub fn save_recurrences(&self, book: &RecurrenceBook) -> Result<(), PlannerError> {
        let path = self.recurrences_path();
        write_json(&path, book)?;
        info!(path = %path.display(), rules = book.rules.len(), "saved recurrences");
        Ok(())
    }

    /// Week starts of every saved week, oldest first
    pub fn saved_weeks(&self) -> Result<Vec<NaiveDate>, PlannerError> {
        let dir = self.weeks_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir).map_err(|e| PlannerError::ReadError {
            path: dir.clone(),
            source: e,
        })?;

        let mut weeks = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && let Ok(date) = NaiveDate::parse_from_str(stem, "%Y-%m-%d")
            {
                weeks.push(date);
            }
        }
        weeks.sort();
        Ok(weeks)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PlannerError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| PlannerError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let value = serde_json::from_str(&text).map_err(|e| PlannerError::JsonError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(Some(value))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PlannerError> {
    let write_err = |e: io::Error| PlannerError::WriteError {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let mut text = serde_json::to_string_pretty(value).map_err(|e| PlannerError::JsonError {
        path: path.to_path_buf(),
        source: e,
    })?;
    text.push('\n');
    atomic_write(path, text.as_bytes()).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::recurrence::{Frequency, RecurrenceRule};
    use crate::model::task::{Task, TaskLocation, TaskStatus};
    use crate::model::week::Group;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn create_planner(root: &Path) -> Planner {
        let dir = root.join(PLANNER_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CONFIG_FILE), "[planner]\nname = \"Test\"\n").unwrap();
        Planner::open(root).unwrap()
    }

    #[test]
    fn test_discover_planner_walks_up() {
        let tmp = TempDir::new().unwrap();
        create_planner(tmp.path());
        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(discover_planner(&nested).unwrap(), tmp.path());
    }

    #[test]
    fn test_discover_planner_requires_config() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(PLANNER_DIR)).unwrap();
        assert!(matches!(
            discover_planner(tmp.path()),
            Err(PlannerError::NotAPlanner)
        ));
    }

    #[test]
    fn test_missing_week_is_empty() {
        let tmp = TempDir::new().unwrap();
        let planner = create_planner(tmp.path());
        let week = planner.load_week(date("2024-01-10")).unwrap();
        assert_eq!(week, WeekState::empty(date("2024-01-07")));
    }

    #[test]
    fn test_week_round_trip() {
        let tmp = TempDir::new().unwrap();
        let planner = create_planner(tmp.path());

        let mut week = WeekState::empty(date("2024-01-07"));
        week.groups.push(Group::new("g", "Errands", 1, 0));
        let mut task = Task::new("t1", "Bank", 1, 0);
        task.group_id = Some("g".into());
        task.status = TaskStatus::Moved;
        task.location = Some(TaskLocation::new("Main St", "https://maps.example/x"));
        task.recurrence_id = Some("r".into());
        task.occurrence_date = Some(date("2024-01-08"));
        week.tasks.push(task);

        planner.save_week(&week).unwrap();
        assert!(tmp.path().join("planner/weeks/2024-01-07.json").exists());

        // Any date in the week finds the same file
        let loaded = planner.load_week(date("2024-01-13")).unwrap();
        assert_eq!(loaded, week);
    }

    #[test]
    fn test_week_file_uses_planner_keys() {
        let tmp = TempDir::new().unwrap();
        let planner = create_planner(tmp.path());
        let mut week = WeekState::empty(date("2024-01-07"));
        let mut task = Task::new("t1", "Gym", 0, 0);
        task.occurrence_date = Some(date("2024-01-07"));
        week.tasks.push(task);
        planner.save_week(&week).unwrap();

        let text = fs::read_to_string(planner.week_path(date("2024-01-07"))).unwrap();
        assert!(text.contains("\"weekStart\": \"2024-01-07\""));
        assert!(text.contains("\"occurrenceDateISO\": \"2024-01-07\""));
        assert!(text.contains("\"dayIndex\": 0"));
    }

    #[test]
    fn test_recurrences_round_trip() {
        let tmp = TempDir::new().unwrap();
        let planner = create_planner(tmp.path());
        assert_eq!(planner.load_recurrences().unwrap(), RecurrenceBook::default());

        let mut book = RecurrenceBook::default();
        book.add_rule(RecurrenceRule::new("b", "Second", Frequency::Week, 2, date("2024-01-02")))
            .unwrap();
        book.add_rule(RecurrenceRule::new("a", "First", Frequency::Month, 1, date("2024-01-31")))
            .unwrap();
        book.skip_occurrence("a", date("2024-02-29"));

        planner.save_recurrences(&book).unwrap();
        let loaded = planner.load_recurrences().unwrap();
        assert_eq!(loaded, book);
        let ids: Vec<&str> = loaded.rules.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_corrupt_json_names_the_file() {
        let tmp = TempDir::new().unwrap();
        let planner = create_planner(tmp.path());
        fs::write(planner.recurrences_path(), "{ not json").unwrap();

        let err = planner.load_recurrences().unwrap_err();
        assert!(matches!(err, PlannerError::JsonError { .. }));
        assert!(err.to_string().contains("recurrences.json"));
    }

    #[test]
    fn test_saved_weeks_sorted() {
        let tmp = TempDir::new().unwrap();
        let planner = create_planner(tmp.path());
        planner.save_week(&WeekState::empty(date("2024-02-04"))).unwrap();
        planner.save_week(&WeekState::empty(date("2024-01-07"))).unwrap();
        fs::write(planner.weeks_dir().join("notes.txt"), "ignored").unwrap();

        assert_eq!(
            planner.saved_weeks().unwrap(),
            vec![date("2024-01-07"), date("2024-02-04")]
        );
    }

    #[test]
    fn test_atomic_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.txt");

        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }
}
