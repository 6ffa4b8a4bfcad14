//! Program counter symbolication.
//!
//! A [`Symbolizer`] turns an ordered list of addresses into one [`SymbolInfo`]
//! per address, in the same order. [`SymbolResolver`] sits in front of a
//! backend and either memoizes single-address lookups in a [`SymbolCache`] or
//! forwards whole batches in one call.

use super::cache::SymbolCache;
use crate::utils::error::SymbolError;
use log::debug;

/// Symbol information for one program counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Address as echoed by the symbolizer
    pub pc: String,

    /// Innermost function name
    pub function: String,

    /// Source location as `file:line`
    pub origin: String,

    /// Frames this function was inlined into, innermost first
    pub inlined_chain: Vec<String>,
}

impl SymbolInfo {
    /// Inlined frames rendered as a single annotation
    pub fn inlined_text(&self) -> String {
        self.inlined_chain
            .iter()
            .map(|frame| format!("(inlined by) {}", frame))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Address-to-symbol backend
pub trait Symbolizer {
    /// Resolve `addresses`, returning exactly one entry per address in order
    fn symbolize(&mut self, addresses: &[String]) -> Result<Vec<SymbolInfo>, SymbolError>;
}

/// Parse addr2line-style output (`-f -a -i`) for `count` addresses
///
/// Each address contributes an echoed pc line starting with `0x`, a function
/// line and an origin line, followed by any number of inlined-frame lines that
/// run until the next `0x` line.
///
/// # Errors
/// * `SymbolError::ShortOutput` - fewer than three lines left for an address
/// * `SymbolError::MalformedOutput` - an entry does not start with an address,
///   or lines remain after the last address
pub fn parse_symbolizer_output(lines: &[&str], count: usize) -> Result<Vec<SymbolInfo>, SymbolError> {
    let lines: Vec<&str> = lines
        .iter()
        .map(|line| line.trim_end())
        .filter(|line| !line.is_empty())
        .collect();

    let short = || SymbolError::ShortOutput {
        expected: count * 3,
        got: lines.len(),
    };

    let mut infos = Vec::with_capacity(count);
    let mut cursor = 0;

    for _ in 0..count {
        let entry = lines.get(cursor..cursor + 3).ok_or_else(short)?;
        if !is_address_line(entry[0]) {
            return Err(SymbolError::MalformedOutput(format!(
                "expected address line, found '{}'",
                entry[0]
            )));
        }
        cursor += 3;

        let inlined_chain: Vec<String> = lines[cursor..]
            .iter()
            .take_while(|line| !is_address_line(line))
            .map(|line| line.to_string())
            .collect();
        cursor += inlined_chain.len();

        infos.push(SymbolInfo {
            pc: entry[0].to_string(),
            function: entry[1].to_string(),
            origin: entry[2].to_string(),
            inlined_chain,
        });
    }

    if cursor != lines.len() {
        return Err(SymbolError::MalformedOutput(format!(
            "{} unexpected trailing lines",
            lines.len() - cursor
        )));
    }

    Ok(infos)
}

fn is_address_line(line: &str) -> bool {
    line.starts_with("0x")
}

/// Parse a trace program counter, with or without `0x` prefix
pub fn parse_address(pc: &str) -> Result<u64, SymbolError> {
    let digits = pc.trim().trim_start_matches("0x");
    u64::from_str_radix(digits, 16).map_err(|_| SymbolError::InvalidAddress(pc.to_string()))
}

/// Resolves program counters through a backend, optionally memoized
pub struct SymbolResolver<S> {
    backend: S,
    cache: Option<SymbolCache>,
}

impl<S: Symbolizer> SymbolResolver<S> {
    /// Resolve one address per backend call, memoizing results in `cache`
    pub fn cached(backend: S, cache: SymbolCache) -> Self {
        Self {
            backend,
            cache: Some(cache),
        }
    }

    /// Resolve each batch with a single backend call and no memoization
    pub fn batched(backend: S) -> Self {
        Self {
            backend,
            cache: None,
        }
    }

    pub fn cache(&self) -> Option<&SymbolCache> {
        self.cache.as_ref()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Resolve `pcs`, returning one [`SymbolInfo`] per pc in submitted order
    pub fn resolve(&mut self, pcs: &[String]) -> Result<Vec<SymbolInfo>, SymbolError> {
        if pcs.is_empty() {
            return Ok(Vec::new());
        }

        let infos = match self.cache.as_mut() {
            Some(cache) => resolve_cached(&mut self.backend, cache, pcs)?,
            None => {
                debug!("Resolving batch of {} addresses", pcs.len());
                self.backend.symbolize(pcs)?
            }
        };

        if infos.len() != pcs.len() {
            return Err(SymbolError::MalformedOutput(format!(
                "resolved {} symbols for {} addresses",
                infos.len(),
                pcs.len()
            )));
        }

        Ok(infos)
    }
}

/// **Private** - internal helper for SymbolResolver::resolve
fn resolve_cached<S: Symbolizer>(
    backend: &mut S,
    cache: &mut SymbolCache,
    pcs: &[String],
) -> Result<Vec<SymbolInfo>, SymbolError> {
    let mut infos = Vec::with_capacity(pcs.len());

    for pc in pcs {
        let addr = parse_address(pc)?;
        if let Some(info) = cache.get(addr) {
            infos.push(info);
            continue;
        }

        let mut resolved = backend.symbolize(&[format!("{:#x}", addr)])?;
        let info = match (resolved.pop(), resolved.is_empty()) {
            (Some(info), true) => info,
            _ => {
                return Err(SymbolError::MalformedOutput(format!(
                    "expected exactly one symbol for {}",
                    pc
                )))
            }
        };

        cache.insert(addr, info.clone());
        infos.push(info);
    }

    Ok(infos)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend answering from a fixed table, counting every call
    struct CountingSymbolizer {
        calls: Vec<Vec<String>>,
    }

    impl CountingSymbolizer {
        fn new() -> Self {
            Self { calls: Vec::new() }
        }

        fn calls_for(&self, addr: &str) -> usize {
            self.calls
                .iter()
                .filter(|call| call.iter().any(|a| a == addr))
                .count()
        }
    }

    impl Symbolizer for CountingSymbolizer {
        fn symbolize(&mut self, addresses: &[String]) -> Result<Vec<SymbolInfo>, SymbolError> {
            self.calls.push(addresses.to_vec());
            Ok(addresses
                .iter()
                .map(|a| SymbolInfo {
                    pc: a.clone(),
                    function: format!("fn_{}", a),
                    origin: "main.c:1".to_string(),
                    inlined_chain: Vec::new(),
                })
                .collect())
        }
    }

    #[test]
    fn test_parse_output_with_inlined_frames() {
        let output = [
            "0x0000000080000000",
            "helper",
            "lib.c:10",
            "main",
            "main.c:42",
            "0x0000000080000004",
            "main",
            "main.c:43",
            "",
        ];

        let infos = parse_symbolizer_output(&output, 2).unwrap();

        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].function, "helper");
        assert_eq!(infos[0].origin, "lib.c:10");
        assert_eq!(infos[0].inlined_chain, vec!["main", "main.c:42"]);
        assert_eq!(infos[1].pc, "0x0000000080000004");
        assert!(infos[1].inlined_chain.is_empty());
        assert_eq!(
            infos[0].inlined_text(),
            "(inlined by) main (inlined by) main.c:42"
        );
    }

    #[test]
    fn test_parse_output_short() {
        let output = ["0x0000000080000000", "main"];
        let err = parse_symbolizer_output(&output, 1).unwrap_err();
        assert!(matches!(err, SymbolError::ShortOutput { expected: 3, got: 2 }));
    }

    #[test]
    fn test_parse_output_missing_address_line() {
        let output = ["main", "main.c:1", "??"];
        assert!(matches!(
            parse_symbolizer_output(&output, 1),
            Err(SymbolError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x00001000").unwrap(), 0x1000);
        assert_eq!(parse_address("800101e0").unwrap(), 0x8001_01e0);
        assert!(parse_address("zzz").is_err());
    }

    #[test]
    fn test_cached_resolver_invokes_backend_once_per_address() {
        let mut resolver =
            SymbolResolver::cached(CountingSymbolizer::new(), SymbolCache::new(16));
        let pcs = vec!["0x1000".to_string(), "0x1004".to_string(), "0x1000".to_string()];

        let first = resolver.resolve(&pcs).unwrap();
        let second = resolver.resolve(&["00001000".to_string()]).unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(first[0], first[2]);
        assert_eq!(second[0], first[0]);
        assert_eq!(resolver.backend().calls_for("0x1000"), 1);
        assert_eq!(resolver.backend().calls_for("0x1004"), 1);

        let cache = resolver.cache().unwrap();
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 2);
    }

    #[test]
    fn test_batched_resolver_single_call_in_order() {
        let mut resolver = SymbolResolver::batched(CountingSymbolizer::new());
        let pcs = vec!["0x2".to_string(), "0x1".to_string()];

        let infos = resolver.resolve(&pcs).unwrap();

        assert_eq!(resolver.backend().calls.len(), 1);
        assert_eq!(infos[0].function, "fn_0x2");
        assert_eq!(infos[1].function, "fn_0x1");
        assert!(resolver.cache().is_none());
    }

    #[test]
    fn test_empty_batch_skips_backend() {
        let mut resolver = SymbolResolver::batched(CountingSymbolizer::new());
        assert!(resolver.resolve(&[]).unwrap().is_empty());
        assert!(resolver.backend().calls.is_empty());
    }
}
