use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wp", about = concat!("wp v", env!("CARGO_PKG_VERSION"), " - your week is plain text"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different planner directory
    #[arg(short = 'C', long = "planner-dir", global = true)]
    pub planner_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new planner in the current directory
    Init(InitArgs),
    /// Print a week as markdown
    Show(WeekArg),
    /// Materialize recurring tasks into a week and save it
    Expand(WeekArg),
    /// Replace a week with the contents of a markdown file
    Import(ImportArgs),
    /// Write a week as markdown to a file or stdout
    Export(ExportArgs),
    /// List the weeks saved in this planner
    Weeks,
    /// Manage recurring tasks
    Recur(RecurCmd),
    /// Delete a task; recurring occurrences are skipped for good
    Skip(SkipArgs),
    /// Delete every task and group on one day
    Clear(ClearArgs),
    /// Delete every task and group in a week
    ClearWeek(WeekArg),
    /// Set the status of a task
    Status(StatusArgs),
    /// Count open, completed and failed tasks per day
    Stats(WeekArg),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Planner name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Reinitialize even if planner/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Week args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct WeekArg {
    /// Any date in the week, YYYY-MM-DD (default: this week)
    pub week: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Markdown file to import
    pub file: String,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Any date in the week, YYYY-MM-DD (default: this week)
    pub week: Option<String>,
    /// Write to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,
}

#[derive(Args)]
pub struct SkipArgs {
    /// Any date in the week, YYYY-MM-DD
    pub week: String,
    /// Task ID to delete
    pub task_id: String,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Any date in the week, YYYY-MM-DD
    pub week: String,
    /// Day name (Sunday..Saturday) or index 0-6
    pub day: String,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Any date in the week, YYYY-MM-DD
    pub week: String,
    /// Task ID
    pub task_id: String,
    /// New status: open, completed, moved, cancelled, failed
    pub status: String,
}

// ---------------------------------------------------------------------------
// Recurrence args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecurCmd {
    #[command(subcommand)]
    pub action: RecurAction,
}

#[derive(Subcommand)]
pub enum RecurAction {
    /// Add a recurring task
    Add(RecurAddArgs),
    /// List recurring tasks
    List,
    /// Delete a recurring task and all of its occurrences
    Rm(RecurIdArg),
    /// Check whether a recurring task falls on a date
    Occurs(RecurOccursArgs),
}

#[derive(Args)]
pub struct RecurAddArgs {
    /// Task title
    #[arg(long)]
    pub title: String,
    /// Repeat every N units of --freq
    #[arg(long, default_value_t = 1)]
    pub every: u32,
    /// Unit: day, week, or month
    #[arg(long)]
    pub freq: String,
    /// First date, YYYY-MM-DD
    #[arg(long)]
    pub start: String,
    /// Last date (inclusive), YYYY-MM-DD
    #[arg(long)]
    pub end: Option<String>,
    /// Task type: task, event, birthday, holiday
    #[arg(long = "type")]
    pub task_type: Option<String>,
    /// Place occurrences in this group
    #[arg(long)]
    pub group: Option<String>,
}

#[derive(Args)]
pub struct RecurIdArg {
    /// Recurrence ID
    pub id: String,
}

#[derive(Args)]
pub struct RecurOccursArgs {
    /// Recurrence ID
    pub id: String,
    /// Date to check, YYYY-MM-DD
    pub date: String,
}
