use chrono::NaiveDate;
use tracing::{debug, trace, warn};

use crate::ids::{IdGenerator, UuidIds};
use crate::model::config::MarkdownConfig;
use crate::model::task::{MarkdownTask, Task, TaskStatus, TaskType};
use crate::model::week::{Group, WeekState};
use crate::parse::line::{Line, classify_line};
use crate::parse::location::LocationMeta;
use crate::util::dates::{sunday_on_or_before, today};

/// Title of the line written for a day with nothing in it
pub const EMPTY_DAY_PLACEHOLDER_TITLE: &str = "...";

/// Group tasks are indented at least this far; less means the group ended
const GROUP_TASK_INDENT: usize = 2;

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Drop the `- [ ] ...` line the serializer writes for an empty day
    pub skip_placeholders: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            skip_placeholders: true,
        }
    }
}

impl From<&MarkdownConfig> for ParseOptions {
    fn from(config: &MarkdownConfig) -> Self {
        ParseOptions {
            skip_placeholders: config.skip_placeholders,
        }
    }
}

/// Where the parser is in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    AwaitingWeekHeader,
    AwaitingDaysSection,
    /// Inside the days section but not under a recognized day header
    AwaitingDay,
    InDay { day_index: u8 },
    InGroup { day_index: u8, group_id: String },
}

impl Phase {
    fn day_index(&self) -> Option<u8> {
        match self {
            Phase::InDay { day_index } | Phase::InGroup { day_index, .. } => Some(*day_index),
            _ => None,
        }
    }
}

/// Everything the parser has built so far. Each classified line moves it
/// to the next state.
#[derive(Debug, Clone)]
pub struct ParserState {
    pub phase: Phase,
    pub week_start: Option<NaiveDate>,
    pub tasks: Vec<Task>,
    pub groups: Vec<Group>,
    /// Location lines being collected for the task at this index
    pending_location: Option<(usize, LocationMeta)>,
    skipped: usize,
}

impl Default for ParserState {
    fn default() -> Self {
        ParserState {
            phase: Phase::AwaitingWeekHeader,
            week_start: None,
            tasks: Vec::new(),
            groups: Vec::new(),
            pending_location: None,
            skipped: 0,
        }
    }
}

impl ParserState {
    /// Apply one classified line
    pub fn advance(mut self, line: Line<'_>, ids: &mut dyn IdGenerator, options: &ParseOptions) -> Self {
        let absorbed = match self.pending_location.as_mut() {
            Some((_, meta)) => meta.absorb(&line),
            None => false,
        };
        if absorbed {
            return self;
        }
        self.flush_location();

        match line {
            Line::WeekHeader { week_start } => {
                if self.week_start.is_none() {
                    self.week_start = Some(week_start);
                    if self.phase == Phase::AwaitingWeekHeader {
                        self.phase = Phase::AwaitingDaysSection;
                    }
                } else {
                    trace!(%week_start, "ignoring repeated week header");
                }
            }
            Line::DaysSection => {
                if matches!(self.phase, Phase::AwaitingWeekHeader | Phase::AwaitingDaysSection) {
                    self.phase = Phase::AwaitingDay;
                }
            }
            Line::DayHeader { day_index } => {
                self.phase = match day_index {
                    Some(day_index) => Phase::InDay { day_index },
                    None => Phase::AwaitingDay,
                };
            }
            Line::GroupHeader { title } => self.open_group(title, ids),
            Line::Task { indent, task } => self.push_task(indent, task, ids, options),
            Line::Location { .. } | Line::Map { .. } | Line::Other => {
                self.skipped += 1;
            }
            Line::Blank => {}
        }
        self
    }

    /// Close out the document. Without a week header the week is the one
    /// containing `today`.
    pub fn finish(mut self, today: NaiveDate) -> WeekState {
        self.flush_location();

        let week_start = match self.week_start {
            Some(date) => {
                let sunday = sunday_on_or_before(date);
                if sunday != date {
                    warn!(%date, %sunday, "week header is not a Sunday, using the Sunday before it");
                }
                sunday
            }
            None => {
                debug!("no week header found, defaulting to the current week");
                sunday_on_or_before(today)
            }
        };

        debug!(
            %week_start,
            tasks = self.tasks.len(),
            groups = self.groups.len(),
            skipped = self.skipped,
            "parsed week document"
        );

        WeekState {
            week_start,
            tasks: self.tasks,
            groups: self.groups,
        }
    }

    fn open_group(&mut self, title: &str, ids: &mut dyn IdGenerator) {
        let Some(day_index) = self.phase.day_index() else {
            trace!(title, "dropping group header outside of a day");
            self.skipped += 1;
            return;
        };

        let position = self.groups.iter().filter(|g| g.day_index == day_index).count()
            + self
                .tasks
                .iter()
                .filter(|t| t.day_index == day_index && t.group_id.is_none())
                .count();
        let group = Group::new(ids.next_id(), title, day_index, to_position(position));
        self.phase = Phase::InGroup {
            day_index,
            group_id: group.id.clone(),
        };
        self.groups.push(group);
    }

    fn push_task(
        &mut self,
        indent: usize,
        parsed: MarkdownTask,
        ids: &mut dyn IdGenerator,
        options: &ParseOptions,
    ) {
        let (day_index, group_id) = match self.phase.clone() {
            Phase::InDay { day_index } => (day_index, None),
            Phase::InGroup { day_index, .. } if indent < GROUP_TASK_INDENT => {
                // Dedent ends the group for this line and everything after
                self.phase = Phase::InDay { day_index };
                (day_index, None)
            }
            Phase::InGroup {
                day_index,
                group_id,
            } => (day_index, Some(group_id)),
            _ => {
                trace!(title = %parsed.title, "dropping task outside of a day");
                self.skipped += 1;
                return;
            }
        };

        if options.skip_placeholders && group_id.is_none() && self.is_placeholder(day_index, &parsed) {
            trace!(day_index, "skipping empty-day placeholder");
            return;
        }

        let position = self
            .tasks
            .iter()
            .filter(|t| t.in_context(day_index, group_id.as_deref()))
            .count();

        let mut task = Task::new(ids.next_id(), parsed.title, day_index, to_position(position));
        task.status = parsed.status;
        task.task_type = parsed.task_type;
        task.group_id = group_id;

        self.pending_location = Some((self.tasks.len(), LocationMeta::default()));
        self.tasks.push(task);
    }

    /// The placeholder counts only as the first thing in an otherwise empty day
    fn is_placeholder(&self, day_index: u8, parsed: &MarkdownTask) -> bool {
        parsed.status == TaskStatus::Open
            && parsed.task_type == TaskType::Task
            && parsed.title == EMPTY_DAY_PLACEHOLDER_TITLE
            && !self.tasks.iter().any(|t| t.day_index == day_index)
            && !self.groups.iter().any(|g| g.day_index == day_index)
    }

    fn flush_location(&mut self) {
        if let Some((idx, meta)) = self.pending_location.take()
            && let Some(location) = meta.into_location()
            && let Some(task) = self.tasks.get_mut(idx)
        {
            task.location = Some(location);
        }
    }
}

fn to_position(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Parse a week document with random ids, relative to today's date.
/// Never fails: unrecognized lines are skipped.
pub fn parse_weekly_markdown(text: &str) -> WeekState {
    parse_weekly_markdown_with(text, &mut UuidIds, &ParseOptions::default(), today())
}

/// Parse a week document with the given id source. `today` decides the
/// week when the document has no header.
pub fn parse_weekly_markdown_with(
    text: &str,
    ids: &mut dyn IdGenerator,
    options: &ParseOptions,
    today: NaiveDate,
) -> WeekState {
    text.lines()
        .map(classify_line)
        .fold(ParserState::default(), |state, line| {
            state.advance(line, &mut *ids, options)
        })
        .finish(today)
}
