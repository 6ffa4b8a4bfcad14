//! Offload lookahead correlation.
//!
//! Loads served by the LSU retire in the core before their data arrives.
//! The core marks such a load with `<~~ Word` in its comment and the LSU later
//! reports the write-back as `(lsu) <reg>  <-- <value>`, either on an
//! instruction line or on an accelerator-only retirement line. A full pass over
//! the file pairs each issue with its write-back so the event for the load can
//! span the real latency instead of the gap to the next instruction.

use super::line::{decode_retirement, Dialect, TimeBasis};
use crate::utils::config::DEFERRED_LOAD_MARKER;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static DEFERRED_LOAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-z]*[0-9]*|zero) *<~~ Word").expect("deferred load grammar is valid")
});

/// An open search for the write-back of a deferred load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    /// Substring that marks the completion in a later comment
    pub pattern: String,

    /// Timestamp of the issuing instruction
    pub issue_time: u64,
}

impl PendingSearch {
    pub fn new(dst_reg: &str, issue_time: u64) -> Self {
        Self {
            pattern: completion_pattern(dst_reg),
            issue_time,
        }
    }
}

/// Completion marker the LSU prints when writing back `dst_reg`
pub fn completion_pattern(dst_reg: &str) -> String {
    format!("(lsu) {}  <--", dst_reg)
}

/// Destination register of a deferred load comment, if it can be parsed
pub fn deferred_destination(comment: &str) -> Option<&str> {
    DEFERRED_LOAD
        .captures(comment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|reg| !reg.is_empty())
}

/// Issue time to completion time of deferred loads in one trace file
///
/// Issue times without an entry completed after the end of the file (or never);
/// their events fall back to the timestamp of the next record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookaheadTable {
    completions: HashMap<u64, u64>,
}

impl LookaheadTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, issue_time: u64, completion_time: u64) {
        self.completions.insert(issue_time, completion_time);
    }

    pub fn get(&self, issue_time: u64) -> Option<u64> {
        self.completions.get(&issue_time).copied()
    }

    pub fn len(&self) -> usize {
        self.completions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completions.is_empty()
    }
}

/// Build the lookahead table for one trace file
///
/// Every line is visited once, in order. A decoded instruction whose comment
/// carries the deferred-load marker opens a search; every later line, decoded
/// instruction or accelerator retirement, is checked against the open searches.
/// For each pattern only the oldest open search completes on a given line, so
/// a register reused before its first write-back pairs issues and completions
/// in order.
pub fn correlate<'a, I>(lines: I, dialect: Dialect, basis: TimeBasis) -> LookaheadTable
where
    I: IntoIterator<Item = &'a str>,
{
    let mut table = LookaheadTable::new();
    let mut searches: Vec<PendingSearch> = Vec::new();

    for line in lines {
        let (time, comment, issued) = if let Some(record) = dialect.decode(line) {
            let time = record.timestamp(basis);
            let issued = open_search(&record.comment, time);
            (time, record.comment, issued)
        } else if let Some(retired) = decode_retirement(line) {
            (retired.timestamp(basis), retired.comment, None)
        } else {
            continue;
        };

        complete_searches(&mut searches, &mut table, &comment, time);

        if let Some(search) = issued {
            searches.push(search);
        }
    }

    if !searches.is_empty() {
        debug!(
            "{} deferred loads did not complete before end of trace",
            searches.len()
        );
    }
    debug!("Lookahead resolved {} deferred loads", table.len());

    table
}

/// Open a search if `comment` marks a deferred load
///
/// **Private** - internal helper for correlate
fn open_search(comment: &str, issue_time: u64) -> Option<PendingSearch> {
    if !comment.contains(DEFERRED_LOAD_MARKER) {
        return None;
    }

    match deferred_destination(comment) {
        Some(dst_reg) => Some(PendingSearch::new(dst_reg, issue_time)),
        None => {
            warn!("Unsupported load lookahead: {}", comment);
            None
        }
    }
}

/// Close every search whose pattern occurs in `comment`, oldest first per pattern
///
/// **Private** - internal helper for correlate
fn complete_searches(
    searches: &mut Vec<PendingSearch>,
    table: &mut LookaheadTable,
    comment: &str,
    time: u64,
) {
    if searches.is_empty() {
        return;
    }

    let mut completed: HashSet<String> = HashSet::new();

    searches.retain(|search| {
        if completed.contains(&search.pattern) || !comment.contains(&search.pattern) {
            return true;
        }
        table.insert(search.issue_time, time);
        completed.insert(search.pattern.clone());
        false
    });
}
