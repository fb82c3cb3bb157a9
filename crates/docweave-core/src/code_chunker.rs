//! Structural code chunker.
//!
//! Splits a source file into definition-scoped fragments by scanning
//! lines and tracking indentation depth. Each `def`/`class` header opens
//! a scope; a later header at the same or shallower indentation closes
//! it. Nested definitions produce dotted section paths (`Outer.inner`),
//! so an inner fragment's id embeds the enclosing scope's id.
//!
//! Chunking is total over any string input: a file with no definitions
//! yields zero fragments, never an error.

use crate::chunker::ChunkerConfig;
use crate::models::{Fragment, OriginKind};

/// An open scope on the parse stack.
struct ScopeFrame {
    /// Dotted identifier path from the outermost enclosing scope.
    path: String,
    /// Indentation width of the header line that opened the scope.
    indent: usize,
    /// Line number of the header (1-based).
    start_line: usize,
}

/// Chunk a code file into definition-scoped fragments.
///
/// Lines outside any open scope are discarded. Scopes still open at
/// end-of-file close using the last line number. Fragments whose span is
/// empty after stripping are dropped.
pub fn chunk_code(source: &str, file_id: &str, config: &ChunkerConfig) -> Vec<Fragment> {
    let lines: Vec<&str> = source.lines().collect();
    let mut stack: Vec<ScopeFrame> = Vec::new();
    let mut fragments: Vec<Fragment> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let Some(caps) = config.def_header.captures(line) else {
            continue;
        };
        let indent = caps[1].len();
        let name = caps[2].to_string();

        // A header at the same or shallower indentation closes every
        // scope opened at that depth or deeper.
        while stack.last().is_some_and(|top| top.indent >= indent) {
            let frame = stack.pop().unwrap();
            close_scope(&frame, &lines, line_no - 1, file_id, &mut fragments);
        }

        let path = match stack.last() {
            Some(parent) => format!("{}.{}", parent.path, name),
            None => name,
        };
        stack.push(ScopeFrame {
            path,
            indent,
            start_line: line_no,
        });
    }

    // Unterminated scopes close at end-of-file.
    let last_line = lines.len();
    while let Some(frame) = stack.pop() {
        close_scope(&frame, &lines, last_line, file_id, &mut fragments);
    }

    // Scopes are emitted as they close (innermost first); present them
    // outer-before-inner in line order.
    fragments.sort_by(|a, b| {
        a.start_line
            .cmp(&b.start_line)
            .then(b.end_line.cmp(&a.end_line))
    });
    fragments
}

fn close_scope(
    frame: &ScopeFrame,
    lines: &[&str],
    end_line: usize,
    file_id: &str,
    out: &mut Vec<Fragment>,
) {
    if end_line < frame.start_line {
        return;
    }
    let span = lines[frame.start_line - 1..end_line].join("\n");
    if let Some(fragment) = Fragment::new(
        OriginKind::Code,
        file_id,
        &frame.path,
        &span,
        frame.start_line,
        end_line,
    ) {
        out.push(fragment);
    }
}
