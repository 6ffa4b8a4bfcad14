//! Trace line decoding and lookahead correlation.
//!
//! This module handles:
//! - Decoding raw trace lines of either dialect
//! - Recognizing accelerator-only retirement lines
//! - Pairing deferred loads with their write-back

pub mod line;
pub mod lookahead;

// Re-export main types
pub use line::{decode_retirement, DecodedRecord, Dialect, RetiredLine, TimeBasis};
pub use lookahead::{correlate, LookaheadTable, PendingSearch};
