//! Output JSON schema definitions for trace documents.
//!
//! This module defines the structure of the Trace Event Format files we write
//! to disk. Field names follow what trace viewers expect, so several fields are
//! renamed on the wire.

use serde::{Deserialize, Serialize};

/// A complete ("X" phase) event for one retired instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Instruction mnemonic
    pub name: String,

    /// Event category
    pub cat: String,

    /// Event phase
    pub ph: String,

    /// Start timestamp (time or cycle)
    pub ts: u64,

    /// Duration in the same unit as `ts`
    pub dur: u64,

    /// Process: executable path and hart id
    pub pid: String,

    /// Thread: resolved function name
    pub tid: String,

    pub args: EventArgs,
}

/// Per-event details shown in the viewer's selection panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventArgs {
    /// Program counter as it appears in the trace
    pub pc: String,

    /// Mnemonic and operands
    pub instr: String,

    /// Raw cycle column of the trace line
    pub time: String,

    /// Source location `file:line`
    #[serde(rename = "Origin")]
    pub origin: String,

    /// Inlined-frame annotation
    #[serde(rename = "inline")]
    pub inlined: String,
}

/// Top-level trace document as read back from disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDocument {
    #[serde(rename = "traceEvents")]
    pub trace_events: Vec<Event>,

    #[serde(rename = "displayTimeUnit", default, skip_serializing_if = "Option::is_none")]
    pub display_time_unit: Option<String>,

    #[serde(rename = "otherData", default, skip_serializing_if = "Option::is_none")]
    pub other_data: Option<TraceMetadata>,
}

/// Producer metadata stored under `otherData`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceMetadata {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the document was generated
    pub generated_at: String,
}
