pub mod config_io;
pub mod planner_io;

pub use planner_io::{Planner, PlannerError, atomic_write, discover_planner};
