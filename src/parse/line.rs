use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::model::task::MarkdownTask;
use crate::parse::task_parser::parse_indented_task_line;
use crate::util::dates::{day_index_from_name, parse_iso_date, week_start_of};

const WEEK_HEADER_PREFIX: &str = "# Week of ";
const DAYS_SECTION: &str = "## Days";
const DAY_HEADER_PREFIX: &str = "### ";
const GROUP_HEADER_PREFIX: &str = "#### Group:";

static LOCATION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+-\s+location:\s+(.+)$").unwrap());
static MAP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+-\s+map:\s+(.+)$").unwrap());

/// One line of a week document, tagged by what it is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// `# Week of 2024-01-07`
    WeekHeader { week_start: NaiveDate },
    /// `## Days`
    DaysSection,
    /// `### Monday 01/08`; `None` when the name is not a day
    DayHeader { day_index: Option<u8> },
    /// `#### Group: Morning routine`
    GroupHeader { title: &'a str },
    /// `- [x] Title`, with the indent of the bullet
    Task { indent: usize, task: MarkdownTask },
    /// `  - location: Cafe`
    Location { label: &'a str },
    /// `  - map: https://...`
    Map { url: &'a str },
    Blank,
    Other,
}

/// Classify a single raw line. Headers are recognized after trimming;
/// task and metadata lines keep their indentation.
pub fn classify_line(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }

    if let Some(rest) = trimmed.strip_prefix(WEEK_HEADER_PREFIX) {
        // Dates whose week runs off the end of the calendar are not headers
        return match parse_iso_date(rest).filter(|d| week_start_of(*d).is_some()) {
            Some(week_start) => Line::WeekHeader { week_start },
            None => Line::Other,
        };
    }

    if trimmed == DAYS_SECTION {
        return Line::DaysSection;
    }

    if let Some(heading) = trimmed.strip_prefix(DAY_HEADER_PREFIX) {
        let name = heading.trim().split(' ').next().unwrap_or("");
        return Line::DayHeader {
            day_index: day_index_from_name(name),
        };
    }

    if let Some(title) = trimmed.strip_prefix(GROUP_HEADER_PREFIX) {
        return Line::GroupHeader {
            title: title.trim(),
        };
    }

    if let Some((indent, task)) = parse_indented_task_line(line) {
        return Line::Task { indent, task };
    }

    if let Some(label) = LOCATION_LINE.captures(line).and_then(|c| c.get(1)) {
        return Line::Location {
            label: label.as_str().trim(),
        };
    }

    if let Some(url) = MAP_LINE.captures(line).and_then(|c| c.get(1)) {
        return Line::Map {
            url: url.as_str().trim(),
        };
    }

    Line::Other
}
