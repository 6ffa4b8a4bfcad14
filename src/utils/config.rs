//! Configuration and constants for the CLI.

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "chrome.json";

/// Default external symbolizer binary
pub const DEFAULT_ADDR2LINE: &str = "addr2line";

/// Maximum number of addresses memoized by the symbol cache
pub const SYMBOL_CACHE_CAPACITY: usize = 1024;

/// The event window drains once it holds more than this many records
pub const WINDOW_THRESHOLD: usize = 10;

// Trace Event Format constants
pub const EVENT_CATEGORY: &str = "instr";
pub const COMPLETE_PHASE: &str = "X";
pub const DISPLAY_TIME_UNIT: &str = "ns";

/// Comment marker of a load whose result is delivered later by the LSU
pub const DEFERRED_LOAD_MARKER: &str = "<~~ Word";
