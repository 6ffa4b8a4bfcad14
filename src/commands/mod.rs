//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod convert;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use convert::{convert_lines, execute_convert, select_lines, validate_args};
pub use models::{ConvertArgs, ConvertSummary, FileStats};
pub use utils::{display_version, validate_trace_file};
