pub mod line;
pub mod location;
pub mod task_parser;
pub mod task_serializer;
pub mod week_parser;
pub mod week_serializer;

pub use line::{Line, classify_line};
pub use location::{location_lines, parse_location_lines};
pub use task_parser::{parse_task_line, task_line_indent};
pub use task_serializer::{serialize_task, serialize_task_line, status_token};
pub use week_parser::{ParseOptions, parse_weekly_markdown, parse_weekly_markdown_with};
pub use week_serializer::week_state_to_markdown;
