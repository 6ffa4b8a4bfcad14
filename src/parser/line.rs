//! Trace line decoder.
//!
//! Matches one raw trace line against the grammar of the selected dialect.
//! Lines that match no grammar (simulator console output, banners, ...) are
//! not errors: the decoder returns `None` and the caller counts them as
//! non-instruction lines.
//!
//! RTL simulation line:
//! ```text
//! 101000 82      M         0x00001000 csrr    a0, mhartid     #; comment
//! time   cycle   priv_lvl  pc         insn    args                comment
//! ```
//!
//! Banshee (instruction-set simulator) line:
//! ```text
//! 00000432 00000206 0005     800101e0  x15:00000064 x15=00000065 # addi    a5, a5, 1
//! cycle    instret  hart_id  pc        register payload              insn
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

static RTL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ *(\d+) +(\d+) +([3M1S0U]?) *(0x[0-9a-f]+) ([.\w]+) +(.+)#; ?(.*)")
        .expect("RTL line grammar is valid")
});

static BANSHEE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ *(\d+) (\d+) (\d+) ([0-9a-f]+) *.+ +.+# (([\w.]*)(?: +(.*))?)")
        .expect("Banshee line grammar is valid")
});

// Retirement of an accelerator (FPU/LSU) instruction, no pc or mnemonic
static RETIREMENT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ *(\d+) +(\d+) +([3M1S0U]?) *#; ?(.*)")
        .expect("retirement line grammar is valid")
});

/// Trace dialect, selecting the grammar used to decode instruction lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Hardware RTL simulation trace, one file per hart
    #[default]
    Rtl,
    /// Banshee offload simulator trace, all harts in one stream
    Banshee,
}

impl Dialect {
    /// Decode one trace line with this dialect's grammar
    pub fn decode(self, line: &str) -> Option<DecodedRecord> {
        match self {
            Dialect::Rtl => decode_rtl(line),
            Dialect::Banshee => decode_banshee(line),
        }
    }
}

/// Which trace column is used as the event timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBasis {
    /// Simulation wall time
    Time,
    /// Cycle counter
    #[default]
    Cycle,
}

/// One decoded instruction line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub time: u64,
    pub cycle: u64,

    /// Cycle column exactly as printed, leading zeros included
    pub raw_cycle: String,

    /// Privilege level (RTL) or hart id (Banshee)
    pub priv_or_hart: String,

    /// Program counter as it appears in the trace
    pub pc: String,

    pub instruction: String,
    pub args: String,
    pub comment: String,
}

impl DecodedRecord {
    /// Timestamp of this record under the given basis
    pub fn timestamp(&self, basis: TimeBasis) -> u64 {
        match basis {
            TimeBasis::Time => self.time,
            TimeBasis::Cycle => self.cycle,
        }
    }
}

/// A line reporting only the retirement of an accelerator instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetiredLine {
    pub time: u64,
    pub cycle: u64,
    pub privilege: String,
    pub comment: String,
}

impl RetiredLine {
    pub fn timestamp(&self, basis: TimeBasis) -> u64 {
        match basis {
            TimeBasis::Time => self.time,
            TimeBasis::Cycle => self.cycle,
        }
    }
}

/// Decode an RTL simulation trace line
pub fn decode_rtl(line: &str) -> Option<DecodedRecord> {
    let caps = RTL_LINE.captures(line)?;
    let field = |i: usize| caps.get(i).map_or("", |m| m.as_str().trim());

    Some(DecodedRecord {
        time: field(1).parse().ok()?,
        cycle: field(2).parse().ok()?,
        raw_cycle: field(2).to_string(),
        priv_or_hart: field(3).to_string(),
        pc: field(4).to_string(),
        instruction: field(5).to_string(),
        args: field(6).to_string(),
        comment: field(7).to_string(),
    })
}

/// Decode a Banshee trace line
///
/// The register payload between pc and `#` is ignored. The disassembly after
/// `#` becomes the comment and is split into mnemonic and operands.
pub fn decode_banshee(line: &str) -> Option<DecodedRecord> {
    let caps = BANSHEE_LINE.captures(line)?;
    let field = |i: usize| caps.get(i).map_or("", |m| m.as_str().trim());

    Some(DecodedRecord {
        time: field(1).parse().ok()?,
        cycle: field(2).parse().ok()?,
        raw_cycle: field(2).to_string(),
        priv_or_hart: field(3).to_string(),
        pc: field(4).to_string(),
        instruction: field(6).to_string(),
        args: field(7).to_string(),
        comment: field(5).to_string(),
    })
}

/// Decode an accelerator-only retirement line
pub fn decode_retirement(line: &str) -> Option<RetiredLine> {
    let caps = RETIREMENT_LINE.captures(line)?;
    let field = |i: usize| caps.get(i).map_or("", |m| m.as_str().trim());

    Some(RetiredLine {
        time: field(1).parse().ok()?,
        cycle: field(2).parse().ok()?,
        privilege: field(3).to_string(),
        comment: field(4).to_string(),
    })
}
