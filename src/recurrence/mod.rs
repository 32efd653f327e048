pub mod evaluator;
pub mod expander;

pub use evaluator::occurs_on_date;
pub use expander::{apply_recurrences_to_week, occurrence_id};
