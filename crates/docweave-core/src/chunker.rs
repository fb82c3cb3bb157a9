//! Shared chunker configuration.
//!
//! Both structural chunkers are driven by compiled lexical patterns held
//! in a [`ChunkerConfig`] — an immutable value constructed once by the
//! caller and passed in, rather than process-wide pattern state.

use regex::Regex;

/// Compiled patterns for the structural chunkers.
///
/// The default recognizes Python definition headers (`def`, `async def`,
/// `class`) and ATX markdown headings of depth 1–6. Callers targeting a
/// different corpus construct their own config.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Matches a definition header: captures leading indentation and the
    /// declared identifier.
    pub def_header: Regex,
    /// Matches a heading line: captures the marker run (depth) and the
    /// title text.
    pub heading: Regex,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        ChunkerConfig {
            def_header: Regex::new(r"^([ \t]*)(?:async[ \t]+)?(?:def|class)[ \t]+([A-Za-z_][A-Za-z0-9_]*)")
                .expect("definition header pattern is valid"),
            heading: Regex::new(r"^(#{1,6})\s+(.*)$").expect("heading pattern is valid"),
        }
    }
}
