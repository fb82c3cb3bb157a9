//! Core data models used throughout docweave.
//!
//! These types represent the fragments that flow through the chunking,
//! linking, and retrieval pipeline. Fragments are fixed-field records
//! validated at construction; after creation only `linked_ids` is ever
//! mutated (by the cross-reference linker).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Which corpus a fragment was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginKind {
    /// A source-code file (function/class scopes).
    Code,
    /// A prose documentation file (heading sections).
    Doc,
}

impl OriginKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginKind::Code => "code",
            OriginKind::Doc => "doc",
        }
    }

    /// Parse the stored string form back into the enum.
    pub fn parse(s: &str) -> Option<OriginKind> {
        match s {
            "code" => Some(OriginKind::Code),
            "doc" => Some(OriginKind::Doc),
            _ => None,
        }
    }
}

/// An atomic chunk of code or documentation text with identity,
/// provenance, and span.
///
/// The `id` is deterministic — `<file>:<section>:<start_line>` — so
/// re-chunking an unchanged file reproduces identical identifiers.
/// Nested code scopes use a dotted section path (`Outer.inner`), which
/// means an inner fragment's id embeds its parent's identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Deterministic identifier, unique within a run.
    pub id: String,
    /// Corpus the fragment came from.
    pub origin: OriginKind,
    /// Source file path the fragment was extracted from.
    pub file: String,
    /// Enclosing scope label: dotted identifier path for code, heading
    /// breadcrumb (titles joined with `" > "`) for documentation.
    pub section: String,
    /// Verbatim text span, trailing whitespace stripped.
    pub content: String,
    /// First line of the span (1-based, inclusive).
    pub start_line: usize,
    /// Last line of the span (1-based, inclusive).
    pub end_line: usize,
    /// Ids of cross-referenced fragments. Symmetric by construction,
    /// duplicate-free, and the only field mutated after creation.
    pub linked_ids: Vec<String>,
}

impl Fragment {
    /// Build a fragment, stripping trailing whitespace from the span.
    ///
    /// Returns `None` when the span is empty after stripping — empty
    /// fragments are discarded rather than emitted.
    pub fn new(
        origin: OriginKind,
        file: &str,
        section: &str,
        content: &str,
        start_line: usize,
        end_line: usize,
    ) -> Option<Fragment> {
        let content = content.trim_end();
        if content.trim().is_empty() {
            return None;
        }
        Some(Fragment {
            id: format!("{}:{}:{}", file, section, start_line),
            origin,
            file: file.to_string(),
            section: section.to_string(),
            content: content.to_string(),
            start_line,
            end_line,
            linked_ids: Vec::new(),
        })
    }

    /// SHA-256 of the fragment content, used for embedding staleness
    /// detection.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.content.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Classification of a query toward code-type or doc-type material.
///
/// A pure function of the query text at a point in time; never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryIntent {
    /// Implementation/internals questions — favor code fragments.
    CodeFirst,
    /// Usage/example questions — favor documentation fragments.
    DocFirst,
    /// Ambiguous — blend both corpora evenly.
    Balanced,
}

impl QueryIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::CodeFirst => "code-first",
            QueryIntent::DocFirst => "doc-first",
            QueryIntent::Balanced => "balanced",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_id_deterministic() {
        let a = Fragment::new(OriginKind::Code, "lib.py", "foo", "def foo():\n    pass", 3, 4);
        let b = Fragment::new(OriginKind::Code, "lib.py", "foo", "def foo():\n    pass", 3, 4);
        assert_eq!(a.unwrap().id, b.unwrap().id);
    }

    #[test]
    fn test_empty_span_discarded() {
        assert!(Fragment::new(OriginKind::Doc, "a.md", "Title", "   \n\t\n", 1, 3).is_none());
    }

    #[test]
    fn test_trailing_whitespace_stripped() {
        let f = Fragment::new(OriginKind::Code, "a.py", "f", "def f():\n    pass\n\n  ", 1, 4).unwrap();
        assert_eq!(f.content, "def f():\n    pass");
    }

    #[test]
    fn test_content_hash_changes_with_content() {
        let a = Fragment::new(OriginKind::Code, "a.py", "f", "x = 1", 1, 1).unwrap();
        let b = Fragment::new(OriginKind::Code, "a.py", "f", "x = 2", 1, 1).unwrap();
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn test_origin_kind_roundtrip() {
        assert_eq!(OriginKind::parse("code"), Some(OriginKind::Code));
        assert_eq!(OriginKind::parse("doc"), Some(OriginKind::Doc));
        assert_eq!(OriginKind::parse("other"), None);
        assert_eq!(OriginKind::Code.as_str(), "code");
    }
}
