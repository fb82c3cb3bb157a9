//! Structural document chunker.
//!
//! Splits a prose file into heading-scoped fragments. ATX headings of
//! depth 1–6 open sections; a heading at the same or shallower depth
//! closes every deeper open section. Each fragment's `section` is the
//! breadcrumb of ancestor titles (including its own) joined with
//! `" > "`, and its content is the lines accumulated for that heading
//! only — deeper subsections close out as their own fragments.
//!
//! Content before the first heading is discarded. Chunking is total
//! over any string input.

use crate::chunker::ChunkerConfig;
use crate::models::{Fragment, OriginKind};

/// Separator between breadcrumb components.
pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// An open heading section on the parse stack.
struct SectionFrame {
    depth: usize,
    title: String,
    start_line: usize,
    /// Lines accumulated while this section was innermost, beginning
    /// with its own heading line.
    lines: Vec<String>,
}

/// Chunk a documentation file into heading-scoped fragments.
pub fn chunk_doc(source: &str, file_id: &str, config: &ChunkerConfig) -> Vec<Fragment> {
    let mut stack: Vec<SectionFrame> = Vec::new();
    let mut fragments: Vec<Fragment> = Vec::new();
    let mut total_lines = 0;

    for (idx, line) in source.lines().enumerate() {
        let line_no = idx + 1;
        total_lines = line_no;

        if let Some(caps) = config.heading.captures(line) {
            let depth = caps[1].len();
            let title = caps[2].trim().to_string();

            // A heading at depth d closes every open section of depth >= d.
            while stack.last().is_some_and(|top| top.depth >= depth) {
                let frame = stack.pop().unwrap();
                close_section(frame, &stack, line_no - 1, file_id, &mut fragments);
            }

            stack.push(SectionFrame {
                depth,
                title,
                start_line: line_no,
                lines: vec![line.to_string()],
            });
        } else if let Some(top) = stack.last_mut() {
            top.lines.push(line.to_string());
        }
        // Lines before the first heading fall through and are discarded.
    }

    while let Some(frame) = stack.pop() {
        close_section(frame, &stack, total_lines, file_id, &mut fragments);
    }

    // Sections are emitted as they close (deepest first); present them
    // outer-before-inner in line order.
    fragments.sort_by(|a, b| {
        a.start_line
            .cmp(&b.start_line)
            .then(b.end_line.cmp(&a.end_line))
    });
    fragments
}

fn close_section(
    frame: SectionFrame,
    ancestors: &[SectionFrame],
    end_line: usize,
    file_id: &str,
    out: &mut Vec<Fragment>,
) {
    let breadcrumb: Vec<&str> = ancestors
        .iter()
        .map(|a| a.title.as_str())
        .chain(std::iter::once(frame.title.as_str()))
        .collect();
    let section = breadcrumb.join(BREADCRUMB_SEPARATOR);
    let content = frame.lines.join("\n");

    if let Some(fragment) = Fragment::new(
        OriginKind::Doc,
        file_id,
        &section,
        &content,
        frame.start_line,
        end_line,
    ) {
        out.push(fragment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(source: &str) -> Vec<Fragment> {
        chunk_doc(source, "sample.md", &ChunkerConfig::default())
    }

    #[test]
    fn test_sibling_headings_close_each_other() {
        let source = "# A\n\nBody of A.\n\n## B\n\nBody of B.\n\n# C\n\nBody of C.\n";
        let fragments = chunk(source);
        assert_eq!(fragments.len(), 3);

        let a = &fragments[0];
        let b = &fragments[1];
        let c = &fragments[2];
        assert_eq!(a.section, "A");
        assert_eq!(b.section, "A > B");
        assert_eq!(c.section, "C");

        // A's content stops before B; B's subsection text is its own.
        assert!(a.content.contains("Body of A."));
        assert!(!a.content.contains("Body of B."));
        assert!(b.content.contains("Body of B."));
    }

    #[test]
    fn test_breadcrumbs_lengthen_with_depth() {
        let source = "# Top\n\n## Middle\n\n### Inner\n\ntext\n";
        let fragments = chunk(source);
        let depths: Vec<usize> = fragments
            .iter()
            .map(|f| f.section.split(BREADCRUMB_SEPARATOR).count())
            .collect();
        assert_eq!(depths, vec![1, 2, 3]);
        assert_eq!(fragments[2].section, "Top > Middle > Inner");
    }

    #[test]
    fn test_spans_nest() {
        let source = "# Top\n\n## Middle\n\ntext\n";
        let fragments = chunk(source);
        let top = &fragments[0];
        let middle = &fragments[1];
        assert!(top.start_line <= middle.start_line);
        assert!(middle.end_line <= top.end_line);
    }

    #[test]
    fn test_header_only_section_survives() {
        let source = "# Guide\n\n## Empty\n\n## Full\n\ntext\n";
        let fragments = chunk(source);
        let empty = fragments.iter().find(|f| f.section == "Guide > Empty");
        assert!(empty.is_some(), "header line alone is non-empty content");
        assert_eq!(empty.unwrap().content, "## Empty");
    }

    #[test]
    fn test_preamble_before_first_heading_discarded() {
        let source = "intro text\nmore intro\n\n# First\n\nbody\n";
        let fragments = chunk(source);
        assert_eq!(fragments.len(), 1);
        assert!(!fragments[0].content.contains("intro"));
        assert_eq!(fragments[0].start_line, 4);
    }

    #[test]
    fn test_no_headings_yields_nothing() {
        assert!(chunk("just prose\nwithout any markers\n").is_empty());
        assert!(chunk("").is_empty());
    }

    #[test]
    fn test_last_sections_close_at_eof() {
        let source = "# A\n\n## B\n\ntail text";
        let fragments = chunk(source);
        let a = fragments.iter().find(|f| f.section == "A").unwrap();
        let b = fragments.iter().find(|f| f.section == "A > B").unwrap();
        assert_eq!(a.end_line, 5);
        assert_eq!(b.end_line, 5);
        assert!(b.content.ends_with("tail text"));
    }

    #[test]
    fn test_deep_jump_then_shallow_close() {
        // A depth-1 heading after a depth-4 section closes everything.
        let source = "# A\n#### Deep\ntext\n# Z\nend\n";
        let fragments = chunk(source);
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[1].section, "A > Deep");
        assert_eq!(fragments[2].section, "Z");
    }
}
