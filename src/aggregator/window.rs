//! Windowed event building.
//!
//! Decoded records are buffered until the window holds more than `threshold`
//! of them. It then drains all but the newest record: each drained record's
//! duration runs to the timestamp of the record after it (or to its lookahead
//! completion), and the retained record keeps the horizon for the last one.
//! The program counters of a drained batch are resolved together.

use crate::output::schema::{Event, EventArgs};
use crate::parser::{DecodedRecord, Dialect, LookaheadTable, TimeBasis};
use crate::symbols::{SymbolInfo, SymbolResolver, Symbolizer};
use crate::utils::config::{COMPLETE_PHASE, EVENT_CATEGORY, WINDOW_THRESHOLD};
use crate::utils::error::SymbolError;
use log::debug;
use std::collections::VecDeque;

/// Per-file settings of the event window
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub dialect: Dialect,
    pub basis: TimeBasis,

    /// Drain once more than this many records are buffered
    pub threshold: usize,

    /// Executable path, used in the process identifier
    pub process: String,
}

impl WindowConfig {
    pub fn new(process: impl Into<String>) -> Self {
        Self {
            dialect: Dialect::default(),
            basis: TimeBasis::default(),
            threshold: WINDOW_THRESHOLD,
            process: process.into(),
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_basis(mut self, basis: TimeBasis) -> Self {
        self.basis = basis;
        self
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Event builder state for one trace file
pub struct EventWindow {
    config: WindowConfig,
    hart: String,
    lookahead: LookaheadTable,
    buffer: VecDeque<DecodedRecord>,
}

impl EventWindow {
    pub fn new(config: WindowConfig, hart: impl Into<String>, lookahead: LookaheadTable) -> Self {
        let config = WindowConfig {
            threshold: config.threshold.max(1),
            ..config
        };

        Self {
            buffer: VecDeque::with_capacity(config.threshold + 1),
            config,
            hart: hart.into(),
            lookahead,
        }
    }

    /// Number of records waiting for a successor or a flush
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Buffer `record`, returning the events drained if the window overflowed
    pub fn push<S: Symbolizer>(
        &mut self,
        record: DecodedRecord,
        resolver: &mut SymbolResolver<S>,
    ) -> Result<Vec<Event>, SymbolError> {
        self.buffer.push_back(record);

        if self.buffer.len() > self.config.threshold {
            let count = self.buffer.len() - 1;
            self.drain(count, resolver)
        } else {
            Ok(Vec::new())
        }
    }

    /// Drain every remaining record at end of file
    ///
    /// The final record has no successor: its duration runs to its lookahead
    /// completion if one was recorded, and is 0 otherwise.
    pub fn finish<S: Symbolizer>(
        &mut self,
        resolver: &mut SymbolResolver<S>,
    ) -> Result<Vec<Event>, SymbolError> {
        let count = self.buffer.len();
        self.drain(count, resolver)
    }

    /// **Private** - resolve and convert the oldest `count` records
    fn drain<S: Symbolizer>(
        &mut self,
        count: usize,
        resolver: &mut SymbolResolver<S>,
    ) -> Result<Vec<Event>, SymbolError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let pcs: Vec<String> = self.buffer.iter().take(count).map(|r| r.pc.clone()).collect();
        let infos = resolver.resolve(&pcs)?;

        debug!("Draining {} records ({} buffered)", count, self.buffer.len());

        let records: Vec<DecodedRecord> = self.buffer.drain(..count).collect();
        let horizon = self.buffer.front().map(|r| r.timestamp(self.config.basis));

        let events = records
            .iter()
            .zip(infos)
            .enumerate()
            .map(|(i, (record, info))| {
                let successor = records
                    .get(i + 1)
                    .map(|next| next.timestamp(self.config.basis))
                    .or(horizon);
                self.build_event(record, info, successor)
            })
            .collect();

        Ok(events)
    }

    /// Duration of an event starting at `ts`
    ///
    /// A recorded lookahead completion takes precedence over the successor.
    fn duration(&self, ts: u64, successor: Option<u64>) -> u64 {
        // Every Banshee instruction retires in a single cycle
        if self.config.dialect == Dialect::Banshee {
            return 1;
        }

        self.lookahead
            .get(ts)
            .or(successor)
            .map_or(0, |next| next.saturating_sub(ts))
    }

    fn build_event(&self, record: &DecodedRecord, info: SymbolInfo, successor: Option<u64>) -> Event {
        let ts = record.timestamp(self.config.basis);

        // Banshee interleaves all harts in one file
        let hart = match self.config.dialect {
            Dialect::Banshee => record.priv_or_hart.as_str(),
            Dialect::Rtl => self.hart.as_str(),
        };

        let instr = if record.args.is_empty() {
            record.instruction.clone()
        } else {
            format!("{} {}", record.instruction, record.args)
        };

        Event {
            name: record.instruction.clone(),
            cat: EVENT_CATEGORY.to_string(),
            ph: COMPLETE_PHASE.to_string(),
            ts,
            dur: self.duration(ts, successor),
            pid: format!("{}:hartid{}", self.config.process, hart),
            tid: info.function.clone(),
            args: EventArgs {
                pc: record.pc.clone(),
                instr,
                time: record.raw_cycle.clone(),
                inlined: info.inlined_text(),
                origin: info.origin,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolCache;

    struct StubSymbolizer {
        calls: usize,
    }

    impl Symbolizer for StubSymbolizer {
        fn symbolize(&mut self, addresses: &[String]) -> Result<Vec<SymbolInfo>, SymbolError> {
            self.calls += 1;
            Ok(addresses
                .iter()
                .map(|a| SymbolInfo {
                    pc: a.clone(),
                    function: "main".to_string(),
                    origin: "main.c:7".to_string(),
                    inlined_chain: Vec::new(),
                })
                .collect())
        }
    }

    fn record(cycle: u64) -> DecodedRecord {
        DecodedRecord {
            time: cycle * 1000,
            cycle,
            raw_cycle: cycle.to_string(),
            priv_or_hart: "M".to_string(),
            pc: format!("{:#010x}", 0x1000 + cycle * 4),
            instruction: "addi".to_string(),
            args: "a0, a0, 1".to_string(),
            comment: String::new(),
        }
    }

    fn resolver() -> SymbolResolver<StubSymbolizer> {
        SymbolResolver::batched(StubSymbolizer { calls: 0 })
    }

    #[test]
    fn test_fills_until_threshold() {
        let mut window = EventWindow::new(WindowConfig::new("app.elf"), "0", LookaheadTable::new());
        let mut resolver = resolver();

        for cycle in 0..10 {
            assert!(window.push(record(cycle), &mut resolver).unwrap().is_empty());
        }
        assert_eq!(window.pending(), 10);
        assert_eq!(resolver.backend().calls, 0);
    }

    #[test]
    fn test_drain_keeps_newest_as_horizon() {
        let config = WindowConfig::new("app.elf").with_threshold(3);
        let mut window = EventWindow::new(config, "0", LookaheadTable::new());
        let mut resolver = resolver();

        let mut events = Vec::new();
        for cycle in [10, 12, 15, 21] {
            events.extend(window.push(record(cycle), &mut resolver).unwrap());
        }

        assert_eq!(events.len(), 3);
        assert_eq!(window.pending(), 1);
        assert_eq!(resolver.backend().calls, 1);

        let durations: Vec<u64> = events.iter().map(|e| e.dur).collect();
        assert_eq!(durations, vec![2, 3, 6]);
    }

    #[test]
    fn test_lookahead_overrides_successor() {
        let mut lookahead = LookaheadTable::new();
        lookahead.insert(10, 30);

        let mut window = EventWindow::new(WindowConfig::new("app.elf"), "0", lookahead);
        let mut resolver = resolver();
        window.push(record(10), &mut resolver).unwrap();
        window.push(record(11), &mut resolver).unwrap();

        let events = window.finish(&mut resolver).unwrap();
        assert_eq!(events[0].dur, 20);
        assert_eq!(events[1].dur, 0);
    }

    #[test]
    fn test_last_record_uses_lookahead_when_present() {
        let mut lookahead = LookaheadTable::new();
        lookahead.insert(11, 19);

        let mut window = EventWindow::new(WindowConfig::new("app.elf"), "0", lookahead);
        let mut resolver = resolver();
        window.push(record(10), &mut resolver).unwrap();
        window.push(record(11), &mut resolver).unwrap();

        let events = window.finish(&mut resolver).unwrap();
        assert_eq!(events[1].dur, 8);
        assert_eq!(window.pending(), 0);
    }

    #[test]
    fn test_banshee_uses_record_hart_and_unit_duration() {
        let config = WindowConfig::new("app.elf").with_dialect(Dialect::Banshee);
        let mut window = EventWindow::new(config, "7", LookaheadTable::new());
        let mut resolver = resolver();

        let mut first = record(10);
        first.priv_or_hart = "0003".to_string();
        window.push(first, &mut resolver).unwrap();
        window.push(record(40), &mut resolver).unwrap();

        let events = window.finish(&mut resolver).unwrap();
        assert_eq!(events[0].dur, 1);
        assert_eq!(events[0].pid, "app.elf:hartid0003");
    }

    #[test]
    fn test_event_fields() {
        let mut window = EventWindow::new(WindowConfig::new("app.elf"), "2", LookaheadTable::new());
        let mut resolver = SymbolResolver::cached(StubSymbolizer { calls: 0 }, SymbolCache::new(8));
        window.push(record(5), &mut resolver).unwrap();

        let event = window.finish(&mut resolver).unwrap().remove(0);
        assert_eq!(event.name, "addi");
        assert_eq!(event.cat, "instr");
        assert_eq!(event.ph, "X");
        assert_eq!(event.ts, 5);
        assert_eq!(event.pid, "app.elf:hartid2");
        assert_eq!(event.tid, "main");
        assert_eq!(event.args.pc, "0x00001014");
        assert_eq!(event.args.instr, "addi a0, a0, 1");
        assert_eq!(event.args.time, "5");
        assert_eq!(event.args.origin, "main.c:7");
    }

    #[test]
    fn test_finish_on_empty_window() {
        let mut window = EventWindow::new(WindowConfig::new("app.elf"), "0", LookaheadTable::new());
        let mut resolver = resolver();
        assert!(window.finish(&mut resolver).unwrap().is_empty());
        assert_eq!(resolver.backend().calls, 0);
    }
}
