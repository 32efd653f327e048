mod init;
pub use init::cmd_init;

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::debug;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::ids::{IdGenerator, UuidIds};
use crate::io::planner_io::{self, Planner, PlannerError};
use crate::model::recurrence::{Frequency, RecurrenceRule};
use crate::model::task::{TaskStatus, TaskType};
use crate::model::week::WeekState;
use crate::ops::recurrence_ops::delete_recurrence_series;
use crate::ops::week_ops::{
    adopt_stored_identity, clear_day, clear_week, delete_task_occurrence, set_task_status,
    week_stats,
};
use crate::parse::{ParseOptions, parse_weekly_markdown_with, week_state_to_markdown};
use crate::recurrence::occurs_on_date;
use crate::util::dates::{DAY_NAMES, current_week_start, sunday_on_or_before, today};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    let planner = open_planner(cli.planner_dir.as_deref())?;
    debug!(root = %planner.root.display(), "dispatching command");

    match cli.command {
        // Init is handled in main.rs before planner discovery
        Commands::Init(args) => cmd_init(args, cli.planner_dir.as_deref()),

        // Week commands
        Commands::Show(args) => cmd_show(&planner, args, json),
        Commands::Expand(args) => cmd_expand(&planner, args, json),
        Commands::Import(args) => cmd_import(&planner, args, json),
        Commands::Export(args) => cmd_export(&planner, args),
        Commands::Weeks => cmd_weeks(&planner, json),
        Commands::Skip(args) => cmd_skip(&planner, args),
        Commands::Clear(args) => cmd_clear(&planner, args),
        Commands::ClearWeek(args) => cmd_clear_week(&planner, args),
        Commands::Status(args) => cmd_status(&planner, args),
        Commands::Stats(args) => cmd_stats(&planner, args, json),

        // Recurrences
        Commands::Recur(cmd) => match cmd.action {
            RecurAction::Add(args) => cmd_recur_add(&planner, args),
            RecurAction::List => cmd_recur_list(&planner, json),
            RecurAction::Rm(args) => cmd_recur_rm(&planner, args),
            RecurAction::Occurs(args) => cmd_recur_occurs(&planner, args, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_planner(dir: Option<&str>) -> Result<Planner, Box<dyn std::error::Error>> {
    let start = match dir {
        Some(d) => fs::canonicalize(d).map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))?,
        None => std::env::current_dir().map_err(PlannerError::IoError)?,
    };
    let root = planner_io::discover_planner(&start)?;
    Ok(Planner::open(&root)?)
}

/// Sunday of the week named by a date argument, or of the current week
fn resolve_week(arg: Option<&str>) -> Result<NaiveDate, String> {
    match arg {
        Some(s) => parse_date_arg(s).map(sunday_on_or_before),
        None => Ok(current_week_start()),
    }
}

/// Load a week and fill in its occurrences
fn load_expanded(planner: &Planner, week_start: NaiveDate) -> Result<WeekState, PlannerError> {
    let week = planner.load_week(week_start)?;
    let book = planner.load_recurrences()?;
    Ok(week.with_recurrences(&book))
}

/// Load a week for display, expanding it when `[expand] on_show` is set
fn load_for_display(planner: &Planner, week_start: NaiveDate) -> Result<WeekState, PlannerError> {
    if planner.config.expand.on_show {
        load_expanded(planner, week_start)
    } else {
        planner.load_week(week_start)
    }
}

fn print_markdown(week: &WeekState) {
    print!("{}", week_state_to_markdown(week));
}

// ---------------------------------------------------------------------------
// Week commands
// ---------------------------------------------------------------------------

fn cmd_show(planner: &Planner, args: WeekArg, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let week_start = resolve_week(args.week.as_deref())?;
    let week = load_for_display(planner, week_start)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&week)?);
    } else {
        print_markdown(&week);
    }
    Ok(())
}

fn cmd_expand(planner: &Planner, args: WeekArg, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let week_start = resolve_week(args.week.as_deref())?;
    let before = planner.load_week(week_start)?.tasks.len();
    let week = load_expanded(planner, week_start)?;
    planner.save_week(&week)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&week)?);
    } else {
        println!(
            "Expanded week of {}: {} new occurrence(s)",
            week.week_start.format("%Y-%m-%d"),
            week.tasks.len() - before
        );
    }
    Ok(())
}

fn cmd_import(planner: &Planner, args: ImportArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = PathBuf::from(&args.file);
    let text = fs::read_to_string(&path).map_err(|e| PlannerError::ReadError {
        path: path.clone(),
        source: e,
    })?;

    let options = ParseOptions::from(&planner.config.markdown);
    let parsed = parse_weekly_markdown_with(&text, &mut UuidIds, &options, today());

    // Occurrences that round-tripped through markdown keep their identity
    let stored = load_expanded(planner, parsed.week_start)?;
    let week = adopt_stored_identity(&parsed, &stored);
    planner.save_week(&week)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&week)?);
    } else {
        println!(
            "Imported week of {}: {} task(s), {} group(s)",
            week.week_start.format("%Y-%m-%d"),
            week.tasks.len(),
            week.groups.len()
        );
    }
    Ok(())
}

fn cmd_export(planner: &Planner, args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let week_start = resolve_week(args.week.as_deref())?;
    let week = load_for_display(planner, week_start)?;
    let markdown = week_state_to_markdown(&week);

    match args.output {
        Some(out) => {
            let path = PathBuf::from(&out);
            planner_io::atomic_write(&path, markdown.as_bytes()).map_err(|e| {
                PlannerError::WriteError {
                    path: path.clone(),
                    source: e,
                }
            })?;
            println!("Wrote {}", out);
        }
        None => print!("{}", markdown),
    }
    Ok(())
}

fn cmd_weeks(planner: &Planner, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let weeks = planner.saved_weeks()?;

    if json {
        let out: Vec<SavedWeekJson> = weeks
            .iter()
            .map(|&week_start| SavedWeekJson {
                week_start,
                path: planner.week_path(week_start).display().to_string(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for week_start in weeks {
            println!("{}", week_start.format("%Y-%m-%d"));
        }
    }
    Ok(())
}

fn cmd_skip(planner: &Planner, args: SkipArgs) -> Result<(), Box<dyn std::error::Error>> {
    let week_start = resolve_week(Some(&args.week))?;
    let week = load_expanded(planner, week_start)?;
    let book = planner.load_recurrences()?;

    let (week, updated) = delete_task_occurrence(&week, &book, &args.task_id)?;
    planner.save_week(&week)?;
    if updated != book {
        planner.save_recurrences(&updated)?;
    }
    println!("{}", args.task_id);
    Ok(())
}

fn cmd_clear(planner: &Planner, args: ClearArgs) -> Result<(), Box<dyn std::error::Error>> {
    let week_start = resolve_week(Some(&args.week))?;
    let day_index = parse_day_arg(&args.day)?;
    let week = load_expanded(planner, week_start)?;
    let book = planner.load_recurrences()?;

    let removed = week.tasks.iter().filter(|t| t.day_index == day_index).count();
    let (week, updated) = clear_day(&week, &book, day_index)?;
    planner.save_week(&week)?;
    if updated != book {
        planner.save_recurrences(&updated)?;
    }
    let date = week
        .date_for_day(day_index)
        .map(|d| format!(" {}", d.format("%Y-%m-%d")))
        .unwrap_or_default();
    println!(
        "Cleared {}{}: {} task(s) removed",
        DAY_NAMES[usize::from(day_index)],
        date,
        removed
    );
    Ok(())
}

fn cmd_clear_week(planner: &Planner, args: WeekArg) -> Result<(), Box<dyn std::error::Error>> {
    let week_start = resolve_week(args.week.as_deref())?;
    let week = load_expanded(planner, week_start)?;
    let book = planner.load_recurrences()?;

    let (cleared, updated) = clear_week(&week, &book);
    planner.save_week(&cleared)?;
    if updated != book {
        planner.save_recurrences(&updated)?;
    }
    println!(
        "Cleared week of {}: {} task(s) removed",
        week_start.format("%Y-%m-%d"),
        week.tasks.len()
    );
    Ok(())
}

fn cmd_status(planner: &Planner, args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let week_start = resolve_week(Some(&args.week))?;
    let status: TaskStatus = args.status.parse()?;
    let week = load_expanded(planner, week_start)?;

    let week = set_task_status(&week, &args.task_id, status)?;
    planner.save_week(&week)?;
    println!("{} {}", args.task_id, status.as_str());
    Ok(())
}

fn cmd_stats(planner: &Planner, args: WeekArg, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let week_start = resolve_week(args.week.as_deref())?;
    let week = load_for_display(planner, week_start)?;
    let stats = week_stats(&week);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats_to_json(week_start, &stats))?);
    } else {
        for line in format_week_stats(week_start, &stats) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Recurrence commands
// ---------------------------------------------------------------------------

fn cmd_recur_add(planner: &Planner, args: RecurAddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let frequency: Frequency = args.freq.parse()?;
    let start = parse_date_arg(&args.start)?;

    let mut rule = RecurrenceRule::new(UuidIds.next_id(), args.title, frequency, args.every, start);
    rule.end_date = args.end.as_deref().map(parse_date_arg).transpose()?;
    if let Some(ref t) = args.task_type {
        rule.task_type = t.parse::<TaskType>()?;
    }
    rule.group_id = args.group;

    let mut book = planner.load_recurrences()?;
    let id = rule.id.clone();
    book.add_rule(rule)?;
    planner.save_recurrences(&book)?;
    println!("{}", id);
    Ok(())
}

fn cmd_recur_list(planner: &Planner, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let book = planner.load_recurrences()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rules_to_json(&book))?);
        return Ok(());
    }

    if book.rules.is_empty() {
        println!("No recurring tasks");
        return Ok(());
    }
    for rule in book.rules.values() {
        let skipped = book
            .exceptions
            .get(&rule.id)
            .map_or(0, |ex| ex.skip_dates.len());
        println!("{}", format_rule_line(rule, skipped));
    }
    Ok(())
}

fn cmd_recur_rm(planner: &Planner, args: RecurIdArg) -> Result<(), Box<dyn std::error::Error>> {
    let book = planner.load_recurrences()?;

    let mut removed = 0;
    for week_start in planner.saved_weeks()? {
        let week = planner.load_week(week_start)?;
        let (pruned, _) = delete_recurrence_series(&week, &book, &args.id)?;
        if pruned.tasks.len() != week.tasks.len() {
            removed += week.tasks.len() - pruned.tasks.len();
            planner.save_week(&pruned)?;
        }
    }

    let (_, updated) = delete_recurrence_series(&WeekState::empty(today()), &book, &args.id)?;
    planner.save_recurrences(&updated)?;
    println!("Removed {} ({} occurrence(s))", args.id, removed);
    Ok(())
}

fn cmd_recur_occurs(
    planner: &Planner,
    args: RecurOccursArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let book = planner.load_recurrences()?;
    let date = parse_date_arg(&args.date)?;
    let rule = book
        .rule(&args.id)
        .ok_or_else(|| format!("recurrence not found: {}", args.id))?;

    let occurs = occurs_on_date(rule, date);
    let skipped = book.is_skipped(&args.id, date);

    if json {
        let out = OccursJson {
            id: &args.id,
            date,
            occurs,
            skipped,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if occurs && skipped {
        println!("yes (skipped)");
    } else if occurs {
        println!("yes");
    } else {
        println!("no");
    }
    Ok(())
}
