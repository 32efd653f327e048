use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io::CONFIG_FILE;
use crate::io::planner_io::{self, PLANNER_DIR, Planner};
use crate::model::recurrence::RecurrenceBook;

const PLANNER_TOML_TEMPLATE: &str = r##"[planner]
name = "{name}"

# --- Storage ---
# Paths are relative to planner/.
[storage]
weeks_dir = "weeks"
recurrences_file = "recurrences.json"

# --- Markdown ---
# Drop the "- [ ] ..." line written for empty days when importing.
[markdown]
skip_placeholders = true

# --- Recurrences ---
# Fill in recurring tasks whenever a week is shown or exported.
[expand]
on_show = true
"##;

/// Infer a planner name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_planner_toml(name: &str) -> String {
    PLANNER_TOML_TEMPLATE.replace("{name}", &name.replace('"', "\\\""))
}

pub fn cmd_init(args: InitArgs, dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match dir {
        Some(d) => Path::new(d).to_path_buf(),
        None => std::env::current_dir()?,
    };
    let planner_dir = root.join(PLANNER_DIR);

    // Check if already initialized
    if planner_dir.join(CONFIG_FILE).exists() && !args.force {
        return Err("planner already exists in ./planner/ (use --force to rewrite planner.toml)".into());
    }

    // Check for parent planner and warn
    if let Some(parent) = root.parent()
        && let Ok(parent_root) = planner_io::discover_planner(parent)
    {
        eprintln!(
            "Note: parent planner found at {}/",
            parent_root.join(PLANNER_DIR).display()
        );
        eprintln!("Creating new planner in ./planner/");
    }

    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    });

    fs::create_dir_all(&planner_dir)?;
    planner_io::atomic_write(
        &planner_dir.join(CONFIG_FILE),
        render_planner_toml(&name).as_bytes(),
    )?;

    let planner = Planner::open(&root)?;
    fs::create_dir_all(planner.weeks_dir())?;
    if !planner.recurrences_path().exists() {
        planner.save_recurrences(&RecurrenceBook::default())?;
    }

    println!("Initialized planner: {}", name);
    Ok(())
}
