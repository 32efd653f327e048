use std::fs;
use std::path::Path;

use crate::io::planner_io::PlannerError;
use crate::model::config::PlannerConfig;

/// Name of the config file inside `planner/`
pub const CONFIG_FILE: &str = "planner.toml";

/// Read and parse `planner.toml` from the planner directory
pub fn read_config(planner_dir: &Path) -> Result<PlannerConfig, PlannerError> {
    let config_path = planner_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| PlannerError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: PlannerConfig = toml::from_str(&config_text)?;
    Ok(config)
}
