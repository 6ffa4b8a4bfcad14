//! Convert command implementation.
//!
//! For every trace file, the convert command:
//! 1. Selects the requested line range
//! 2. Runs the lookahead pre-pass (RTL traces)
//! 3. Decodes lines into the event window
//! 4. Resolves drained batches to symbols
//! 5. Streams events into the output document

use super::models::{ConvertArgs, ConvertSummary, FileStats};
use crate::aggregator::{EventWindow, HartAllocator, WindowConfig};
use crate::output::{create_trace_file, TraceWriter};
use crate::parser::{correlate, Dialect, LookaheadTable};
use crate::symbols::{Addr2Line, SymbolCache, SymbolResolver, Symbolizer};
use crate::utils::config::SYMBOL_CACHE_CAPACITY;
use crate::utils::error::PipelineError;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Execute the convert command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Unreadable trace files
/// * Symbolizer failures (fatal for the file being converted)
/// * Output write errors
pub fn execute_convert(args: ConvertArgs) -> Result<ConvertSummary> {
    let start_time = Instant::now();

    info!("elf: {}", args.elf.display());
    info!("traces: {}", args.traces.len());
    info!("addr2line: {}", args.addr2line.display());
    info!("cache: {}", !args.no_cache);

    let mut writer = create_trace_file(&args.output).context("Failed to create output JSON")?;

    let backend = Addr2Line::new(&args.addr2line, &args.elf);
    let mut resolver = if args.no_cache {
        SymbolResolver::batched(backend)
    } else {
        SymbolResolver::cached(backend, SymbolCache::new(SYMBOL_CACHE_CAPACITY))
    };

    let result = convert_traces(&args, &mut resolver, &mut writer);

    // The document is closed even when a file failed
    let finished = writer.finish().context("Failed to finish output JSON");
    let mut summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            warn!(
                "Conversion aborted, {} holds the events written so far",
                args.output.display()
            );
            return Err(err);
        }
    };
    finished?;

    summary.symbolizer_runs = resolver.backend().invocations();
    if let Some(cache) = resolver.cache() {
        info!("Symbol cache: {}", cache.summary());
        summary.cache_hits = cache.hits();
        summary.cache_misses = cache.misses();
    }

    info!("✓ Trace written to: {}", args.output.display());
    info!(
        "Convert completed in {:.2}s: {}",
        start_time.elapsed().as_secs_f64(),
        summary.summary()
    );

    Ok(summary)
}

/// Convert every trace file into the shared output document
///
/// **Private** - internal helper for execute_convert
fn convert_traces<S, W>(
    args: &ConvertArgs,
    resolver: &mut SymbolResolver<S>,
    writer: &mut TraceWriter<W>,
) -> Result<ConvertSummary>
where
    S: Symbolizer,
    W: Write,
{
    let process = args.elf.display().to_string();
    let mut harts = HartAllocator::new();
    let mut summary = ConvertSummary::default();

    for trace in &args.traces {
        let hart = harts.assign(trace);
        info!("Parsing hart {} with trace {}", hart, trace.display());

        let content = read_trace_text(trace)?;
        let all_lines: Vec<&str> = content.lines().collect();
        let lines = select_lines(&all_lines, args.start, args.end);

        let config = WindowConfig::new(process.clone())
            .with_dialect(args.dialect())
            .with_basis(args.basis());

        let stats = convert_lines(lines, config, hart, resolver, writer)
            .with_context(|| format!("Failed to convert trace {}", trace.display()))?;

        info!(" parsed {} of {} lines", stats.parsed, stats.lines);
        summary.add(stats);
    }

    Ok(summary)
}

/// Read a trace file, replacing bytes that are not valid UTF-8
///
/// Simulator console output can carry arbitrary bytes; such lines are
/// decoded lossily and then skipped as non-instruction lines.
///
/// **Private** - internal helper for convert_traces
fn read_trace_text(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read trace {}", path.display()))?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            debug!("{} contains invalid UTF-8, decoding lossily", path.display());
            Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}

/// Convert the lines of one trace file and stream the events to `writer`
///
/// **Public** - the per-file pipeline, independent of where lines, symbols
/// and output come from
pub fn convert_lines<S, W>(
    lines: &[&str],
    config: WindowConfig,
    hart: u64,
    resolver: &mut SymbolResolver<S>,
    writer: &mut TraceWriter<W>,
) -> Result<FileStats, PipelineError>
where
    S: Symbolizer,
    W: Write,
{
    let dialect = config.dialect;

    // Banshee instructions retire in one cycle, nothing to look ahead for
    let lookahead = match dialect {
        Dialect::Rtl => correlate(lines.iter().copied(), dialect, config.basis),
        Dialect::Banshee => LookaheadTable::new(),
    };
    debug!("Lookahead table has {} entries", lookahead.len());

    let mut window = EventWindow::new(config, hart.to_string(), lookahead);
    let mut stats = FileStats {
        lines: lines.len(),
        ..FileStats::default()
    };

    for line in lines {
        let Some(record) = dialect.decode(line) else {
            continue;
        };
        stats.parsed += 1;

        let events = window.push(record, resolver)?;
        writer.write_events(&events)?;
        stats.events += events.len();
    }

    let events = window.finish(resolver)?;
    writer.write_events(&events)?;
    stats.events += events.len();

    Ok(stats)
}

/// Restrict `lines` to `[start, end)`, clamped to the file
pub fn select_lines<'a, 'b>(lines: &'a [&'b str], start: usize, end: Option<usize>) -> &'a [&'b str] {
    let end = end.unwrap_or(lines.len()).min(lines.len());
    let start = start.min(end);
    &lines[start..end]
}

/// Validate convert arguments
///
/// **Public** - can be called before execute_convert for early validation
pub fn validate_args(args: &ConvertArgs) -> Result<()> {
    if args.elf.as_os_str().is_empty() {
        anyhow::bail!("Executable path cannot be empty");
    }

    if !args.elf.is_file() {
        anyhow::bail!("Executable not found: {}", args.elf.display());
    }

    if args.traces.is_empty() {
        anyhow::bail!("At least one trace file is required");
    }

    if let Some(missing) = args.traces.iter().find(|t| !t.is_file()) {
        anyhow::bail!("Trace file not found: {}", missing.display());
    }

    if let Some(end) = args.end {
        if end <= args.start {
            anyhow::bail!("End line ({}) must be after start line ({})", end, args.start);
        }
    }

    Ok(())
}
