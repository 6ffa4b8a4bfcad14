//! Hart id assignment for trace files.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// Assigns a hart id to each trace file
///
/// The id is the last number in the file name (`trace_hart_00000003.dasm` is
/// hart 3). Files without a number are numbered 1, 2, ... in the order they
/// are seen.
#[derive(Debug, Default)]
pub struct HartAllocator {
    last_ordinal: u64,
}

impl HartAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, trace: &Path) -> u64 {
        let name = trace
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match DIGITS
            .find_iter(&name)
            .last()
            .and_then(|m| m.as_str().parse::<u64>().ok())
        {
            Some(id) => id,
            None => {
                self.last_ordinal += 1;
                self.last_ordinal
            }
        }
    }
}
