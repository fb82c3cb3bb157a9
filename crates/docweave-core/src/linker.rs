//! Cross-reference linker.
//!
//! Matches code fragments to the documentation sections that describe
//! them by normalized section name, and records the link ids on both
//! sides. This is a pure name-equality join — a code scope and a doc
//! section are linked only when their normalized titles are identical.
//!
//! Linking is idempotent: running it twice over the same fragments
//! produces identical link lists.

use std::collections::HashMap;

use crate::doc_chunker::BREADCRUMB_SEPARATOR;
use crate::models::{Fragment, OriginKind};

/// Generic words meaning "class"/"function"/"method" that carry no
/// identity, in both corpus languages.
const STOP_WORDS: &[&str] = &[
    "class",
    "function",
    "method",
    "func",
    "def",
    "класс",
    "функция",
    "метод",
];

/// Normalize a fragment's section label into a match key.
///
/// Takes the last breadcrumb component (doc) or the last dotted path
/// component (code), lowercases it, drops stop-words, and collapses
/// whitespace/hyphen/underscore runs to single spaces. Returns an empty
/// key when nothing identifying remains.
pub fn match_key(fragment: &Fragment) -> String {
    let tail = match fragment.origin {
        OriginKind::Doc => fragment
            .section
            .rsplit(BREADCRUMB_SEPARATOR)
            .next()
            .unwrap_or(&fragment.section),
        OriginKind::Code => fragment
            .section
            .rsplit('.')
            .next()
            .unwrap_or(&fragment.section),
    };

    let lowered = tail.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|t| !t.is_empty() && !STOP_WORDS.contains(t))
        .collect();
    tokens.join(" ")
}

/// Establish bidirectional cross-references between code and doc
/// fragments, in place.
///
/// For every code fragment whose normalized key equals a doc fragment's
/// key, each fragment's id is appended to the other's `linked_ids` —
/// skipping ids already present, so repeated calls never duplicate.
/// Fragments with no match keep an empty link list; that is the default
/// state, not an error.
pub fn link(code_fragments: &mut [Fragment], doc_fragments: &mut [Fragment]) {
    let mut doc_index: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, doc) in doc_fragments.iter().enumerate() {
        let key = match_key(doc);
        if key.is_empty() {
            continue;
        }
        doc_index.entry(key).or_default().push(idx);
    }

    for code in code_fragments.iter_mut() {
        let key = match_key(code);
        if key.is_empty() {
            continue;
        }
        let Some(doc_idxs) = doc_index.get(&key) else {
            continue;
        };
        for &doc_idx in doc_idxs {
            let doc = &mut doc_fragments[doc_idx];
            if !code.linked_ids.contains(&doc.id) {
                code.linked_ids.push(doc.id.clone());
            }
            if !doc.linked_ids.contains(&code.id) {
                doc.linked_ids.push(code.id.clone());
            }
        }
    }
}
