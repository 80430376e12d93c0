//! Output formatting for CLI.

mod json;
mod text;

pub use json::{ConfigOutput, JsonFormatter, PagedTracksOutput, TokenOutput};
pub use text::TextFormatter;
