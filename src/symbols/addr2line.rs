//! External `addr2line` symbolizer backend.

use super::resolver::{parse_symbolizer_output, SymbolInfo, Symbolizer};
use crate::utils::error::SymbolError;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs `<binary> -e <elf> -f -a -i <addr>...` and parses its stdout
#[derive(Debug, Clone)]
pub struct Addr2Line {
    binary: PathBuf,
    elf: PathBuf,
    invocations: u64,
}

impl Addr2Line {
    pub fn new(binary: impl Into<PathBuf>, elf: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            elf: elf.into(),
            invocations: 0,
        }
    }

    pub fn elf(&self) -> &Path {
        &self.elf
    }

    /// Number of times the external tool was started
    pub fn invocations(&self) -> u64 {
        self.invocations
    }
}

impl Symbolizer for Addr2Line {
    fn symbolize(&mut self, addresses: &[String]) -> Result<Vec<SymbolInfo>, SymbolError> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        self.invocations += 1;
        debug!(
            "Running {} for {} addresses",
            self.binary.display(),
            addresses.len()
        );

        let output = Command::new(&self.binary)
            .arg("-e")
            .arg(&self.elf)
            .args(["-f", "-a", "-i"])
            .args(addresses)
            .output()
            .map_err(|source| SymbolError::SpawnFailed {
                binary: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(SymbolError::ToolFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = stdout.lines().collect();

        parse_symbolizer_output(&lines, addresses.len())
    }
}
