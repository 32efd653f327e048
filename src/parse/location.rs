use crate::model::task::TaskLocation;
use crate::parse::line::{Line, classify_line};

/// Location fields collected from the metadata lines under a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationMeta {
    pub label: Option<String>,
    pub map_url: Option<String>,
}

impl LocationMeta {
    /// Take in a classified line. Returns false if the line is not location
    /// metadata, which ends the run.
    pub fn absorb(&mut self, line: &Line<'_>) -> bool {
        match line {
            Line::Location { label } => {
                self.label = Some(label.to_string());
                true
            }
            Line::Map { url } => {
                self.map_url = Some(url.to_string());
                true
            }
            _ => false,
        }
    }

    /// A location exists only if a label was seen
    pub fn into_location(self) -> Option<TaskLocation> {
        let label = self.label?;
        Some(TaskLocation::new(label, self.map_url.unwrap_or_default()))
    }
}

/// Consume the `location:` / `map:` lines directly following a task line.
/// Returns the location (if a label was found) and how many lines were
/// consumed; the first non-matching line is left for the caller.
pub fn parse_location_lines<'a, I>(lines: I) -> (Option<TaskLocation>, usize)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut meta = LocationMeta::default();
    let mut consumed = 0;
    for line in lines {
        if !meta.absorb(&classify_line(line)) {
            break;
        }
        consumed += 1;
    }
    (meta.into_location(), consumed)
}

/// Metadata lines for a location, two spaces deeper than the task line.
/// A location without a label has no markdown form and writes nothing.
pub fn location_lines(location: &TaskLocation, task_indent: usize) -> Vec<String> {
    if location.label.trim().is_empty() {
        return Vec::new();
    }
    let meta_indent = " ".repeat(task_indent + 2);
    let mut lines = vec![format!("{}- location: {}", meta_indent, location.label)];
    if !location.map_url.is_empty() {
        lines.push(format!("{}- map: {}", meta_indent, location.map_url));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::LocationProvider;

    #[test]
    fn test_location_and_map() {
        let (location, consumed) =
            parse_location_lines(["  - location: Cafe", "  - map: https://x", "- [ ] Next"]);
        assert_eq!(consumed, 2);
        let location = location.unwrap();
        assert_eq!(location.label, "Cafe");
        assert_eq!(location.map_url, "https://x");
        assert_eq!(location.provider, LocationProvider::Nominatim);
    }

    #[test]
    fn test_map_before_location() {
        let (location, consumed) = parse_location_lines(["    - map: https://m", "    - location: Park"]);
        assert_eq!(consumed, 2);
        assert_eq!(location, Some(TaskLocation::new("Park", "https://m")));
    }

    #[test]
    fn test_location_without_map() {
        let (location, consumed) = parse_location_lines(["  - location: Gym", ""]);
        assert_eq!(consumed, 1);
        assert_eq!(location, Some(TaskLocation::new("Gym", "")));
    }

    #[test]
    fn test_map_only_is_consumed_but_no_location() {
        let (location, consumed) = parse_location_lines(["  - map: https://x", "#### Group: A"]);
        assert_eq!(consumed, 1);
        assert_eq!(location, None);
    }

    #[test]
    fn test_unrelated_content() {
        let (location, consumed) = parse_location_lines(["- [ ] Another task", "  - location: X"]);
        assert_eq!(consumed, 0);
        assert_eq!(location, None);

        // Unindented metadata is not metadata
        let (location, consumed) = parse_location_lines(["- location: Cafe"]);
        assert_eq!((location, consumed), (None, 0));
    }

    #[test]
    fn test_location_lines() {
        let location = TaskLocation::new("Cafe", "");
        assert_eq!(location_lines(&location, 0), vec!["  - location: Cafe"]);
    }

    #[test]
    fn test_unlabeled_location_writes_nothing() {
        let location = TaskLocation::new("  ", "https://x");
        assert!(location_lines(&location, 2).is_empty());
    }
}
