//! Turns decoded trace records into timed, symbolicated events.
//!
//! This module provides:
//! - The per-file event window and its duration rules
//! - Hart id assignment for trace files

pub mod hart;
pub mod window;

// Re-export main types
pub use hart::HartAllocator;
pub use window::{EventWindow, WindowConfig};
