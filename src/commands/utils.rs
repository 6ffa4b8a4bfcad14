use crate::output::read_trace;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Validate a trace JSON file
pub fn validate_trace_file(file_path: PathBuf) -> Result<()> {
    println!("Validating trace: {}", file_path.display());

    let document = read_trace(&file_path)?;
    let processes: BTreeSet<&str> = document
        .trace_events
        .iter()
        .map(|e| e.pid.as_str())
        .collect();

    println!("✓ Valid trace JSON");
    if let Some(meta) = &document.other_data {
        println!("  Version: {}", meta.version);
        println!("  Generated: {}", meta.generated_at);
    }
    println!("  Events: {}", document.trace_events.len());
    println!("  Processes: {}", processes.len());

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("tracevis v{}", env!("CARGO_PKG_VERSION"));
    println!("Trace Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Converts instruction traces into Trace Event Format JSON.");
}
