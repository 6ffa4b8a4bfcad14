use crate::parser::{Dialect, TimeBasis};
use crate::utils::config::{DEFAULT_ADDR2LINE, DEFAULT_OUTPUT};
use std::path::PathBuf;

/// Arguments for the convert command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    /// Executable the traces were recorded from
    pub elf: PathBuf,

    /// Trace files, processed in order
    pub traces: Vec<PathBuf>,

    /// Output path for the trace JSON
    pub output: PathBuf,

    /// Symbolizer binary
    pub addr2line: PathBuf,

    /// Use the time column instead of cycles
    pub use_time: bool,

    /// Parse Banshee traces
    pub banshee: bool,

    /// Resolve each batch with one symbolizer call instead of the cache
    pub no_cache: bool,

    /// First line of each trace to process
    pub start: usize,

    /// Line after the last one to process (None = end of file)
    pub end: Option<usize>,
}

impl ConvertArgs {
    pub fn dialect(&self) -> Dialect {
        if self.banshee {
            Dialect::Banshee
        } else {
            Dialect::Rtl
        }
    }

    pub fn basis(&self) -> TimeBasis {
        if self.use_time {
            TimeBasis::Time
        } else {
            TimeBasis::Cycle
        }
    }
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            elf: PathBuf::new(),
            traces: Vec::new(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            addr2line: PathBuf::from(DEFAULT_ADDR2LINE),
            use_time: false,
            banshee: false,
            no_cache: false,
            start: 0,
            end: None,
        }
    }
}

/// Line counts for one converted trace file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    /// Lines inside the selected range
    pub lines: usize,

    /// Lines decoded as instructions
    pub parsed: usize,

    /// Events written
    pub events: usize,
}

/// Totals of a convert run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub files: usize,
    pub lines: usize,
    pub parsed: usize,
    pub events: usize,
    pub symbolizer_runs: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl ConvertSummary {
    pub fn add(&mut self, stats: FileStats) {
        self.files += 1;
        self.lines += stats.lines;
        self.parsed += stats.parsed;
        self.events += stats.events;
    }

    pub fn summary(&self) -> String {
        format!(
            "{} files, parsed {} of {} lines, {} events, {} symbolizer runs",
            self.files, self.parsed, self.lines, self.events, self.symbolizer_runs
        )
    }
}
