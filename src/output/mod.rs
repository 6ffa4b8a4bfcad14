//! Output writers for trace documents.
//!
//! This module handles:
//! - The Trace Event Format schema
//! - Streaming events into a JSON document
//! - Reading documents back for validation

pub mod json;
pub mod schema;

// Re-export main functions
pub use json::{create_trace_file, read_trace, validate_output_path, TraceWriter};
pub use schema::{Event, EventArgs, TraceDocument, TraceMetadata};
