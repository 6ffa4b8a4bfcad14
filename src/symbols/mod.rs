//! Program counter to function / source location resolution.

pub mod addr2line;
pub mod cache;
pub mod resolver;

pub use self::addr2line::Addr2Line;
pub use cache::SymbolCache;
pub use resolver::{parse_address, parse_symbolizer_output, SymbolInfo, SymbolResolver, Symbolizer};
