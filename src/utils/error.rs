//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while resolving program counters to symbols
#[derive(Error, Debug)]
pub enum SymbolError {
    #[error("Failed to run symbolizer '{binary}': {source}")]
    SpawnFailed {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Symbolizer exited with {status}: {stderr}")]
    ToolFailed { status: String, stderr: String },

    #[error("Symbolizer output too short: expected {expected} lines, got {got}")]
    ShortOutput { expected: usize, got: usize },

    #[error("Malformed symbolizer output: {0}")]
    MalformedOutput(String),

    #[error("Invalid program counter: {0}")]
    InvalidAddress(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that abort the conversion of a single trace file
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Symbol resolution failed: {0}")]
    Symbols(#[from] SymbolError),

    #[error("Event output failed: {0}")]
    Output(#[from] OutputError),
}
