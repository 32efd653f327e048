pub mod task;
pub mod week;
pub mod recurrence;
pub mod config;

pub use task::*;
pub use week::*;
pub use recurrence::*;
pub use config::*;
