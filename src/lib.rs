//! tracevis
//!
//! Converts instruction-level simulator traces into Trace Event Format
//! JSON, with per-instruction durations and symbolicated program counters,
//! ready to be loaded into a trace viewer.
//!
//! This crate provides the core implementation for the `tracevis` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! tracevis convert app.elf trace_hart_00000000.dasm -o chrome.json
//! ```
//!
//! Open the result in `chrome://tracing` or Perfetto.

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod symbols;
pub mod utils;
