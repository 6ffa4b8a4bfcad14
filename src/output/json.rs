//! Trace Event Format JSON writer.
//!
//! Events are streamed into the `traceEvents` array as they are produced, with
//! separators only between elements, so the document is valid JSON once
//! [`TraceWriter::finish`] has run.

use super::schema::{Event, TraceDocument, TraceMetadata};
use crate::utils::config::{DISPLAY_TIME_UNIT, SCHEMA_VERSION};
use crate::utils::error::OutputError;
use chrono::Utc;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Incremental writer of a trace document
pub struct TraceWriter<W: Write> {
    writer: W,
    events: usize,
}

impl<W: Write> TraceWriter<W> {
    /// Start a document, writing its header to `writer`
    pub fn new(mut writer: W) -> Result<Self, OutputError> {
        writer.write_all(b"{\"traceEvents\": [\n")?;
        Ok(Self { writer, events: 0 })
    }

    /// Append one event to the `traceEvents` array
    pub fn write_event(&mut self, event: &Event) -> Result<(), OutputError> {
        if self.events > 0 {
            self.writer.write_all(b",\n")?;
        }
        serde_json::to_writer(&mut self.writer, event)?;
        self.events += 1;
        Ok(())
    }

    /// Append events in order
    pub fn write_events(&mut self, events: &[Event]) -> Result<(), OutputError> {
        events.iter().try_for_each(|event| self.write_event(event))
    }

    pub fn events_written(&self) -> usize {
        self.events
    }

    /// Close the array, write document metadata and flush
    ///
    /// Returns the underlying writer.
    pub fn finish(mut self) -> Result<W, OutputError> {
        let metadata = TraceMetadata {
            version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339(),
        };

        self.writer.write_all(b"\n],\n\"displayTimeUnit\": ")?;
        serde_json::to_writer(&mut self.writer, DISPLAY_TIME_UNIT)?;
        self.writer.write_all(b",\n\"otherData\": ")?;
        serde_json::to_writer(&mut self.writer, &metadata)?;
        self.writer.write_all(b"\n}\n")?;
        self.writer.flush()?;

        debug!("Closed trace document with {} events", self.events);
        Ok(self.writer)
    }
}

/// Create the output file and start a trace document in it
///
/// **Public** - main entry point for file output
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is empty, a directory, or its parent
///   cannot be created
/// * `OutputError::WriteFailed` - I/O error creating the file
pub fn create_trace_file(
    output_path: impl AsRef<Path>,
) -> Result<TraceWriter<BufWriter<File>>, OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing trace to: {}", output_path.display());

    validate_output_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    TraceWriter::new(BufWriter::new(file))
}

/// Validate that output path is writable
pub fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Read a trace document from a JSON file
///
/// **Public** - used by the validate command and tests
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_trace(input_path: impl AsRef<Path>) -> Result<TraceDocument, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading trace from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let document: TraceDocument = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(OutputError::SerializationFailed)?;

    debug!("Trace loaded: {} events", document.trace_events.len());

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::schema::EventArgs;
    use tempfile::NamedTempFile;

    fn create_test_event(ts: u64) -> Event {
        Event {
            name: "addi".to_string(),
            cat: "instr".to_string(),
            ph: "X".to_string(),
            ts,
            dur: 2,
            pid: "app.elf:hartid0".to_string(),
            tid: "main".to_string(),
            args: EventArgs {
                pc: "0x80000000".to_string(),
                instr: "addi a0, a0, 1".to_string(),
                time: ts.to_string(),
                origin: "main.c:3".to_string(),
                inlined: String::new(),
            },
        }
    }

    #[test]
    fn test_document_has_no_trailing_separator() {
        let mut writer = TraceWriter::new(Vec::new()).unwrap();
        writer
            .write_events(&[create_test_event(1), create_test_event(3)])
            .unwrap();
        let bytes = writer.finish().unwrap();

        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains(",\n]"));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let events = value["traceEvents"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["ts"], 3);
        assert_eq!(events[0]["args"]["Origin"], "main.c:3");
        assert_eq!(events[0]["args"]["inline"], "");
    }

    #[test]
    fn test_empty_document_is_valid() {
        let writer = TraceWriter::new(Vec::new()).unwrap();
        let bytes = writer.finish().unwrap();

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["traceEvents"].as_array().unwrap().is_empty());
        assert_eq!(value["otherData"]["version"], SCHEMA_VERSION);
    }

    #[test]
    fn test_write_and_read_trace() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        let mut writer = create_trace_file(path).unwrap();
        writer.write_event(&create_test_event(7)).unwrap();
        writer.finish().unwrap();

        let loaded = read_trace(path).unwrap();
        assert_eq!(loaded.trace_events, vec![create_test_event(7)]);
        assert_eq!(loaded.display_time_unit.as_deref(), Some("ns"));
    }

    #[test]
    fn test_validate_output_path_empty() {
        let result = validate_output_path(Path::new(""));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = validate_output_path(temp_dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_create_makes_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/chrome.json");

        create_trace_file(&nested_path).unwrap().finish().unwrap();

        assert!(nested_path.exists());
    }
}
