//! Adaptive retrieval selection.
//!
//! Takes an over-fetched, rank-ordered candidate set from an external
//! similarity search and blends code and documentation fragments
//! according to the query's intent label, then deduplicates and
//! truncates to the requested size.
//!
//! # Policy
//!
//! | Intent     | Primary                       | Secondary          |
//! |------------|-------------------------------|--------------------|
//! | code-first | first ⌈k/2⌉+1 code candidates | first ⌊k/2⌋ doc    |
//! | doc-first  | first ⌈k/2⌉+1 doc candidates  | first ⌊k/2⌋ code   |
//! | balanced   | ⌊k/2⌋ doc then ⌊k/2⌋ code     | (empty)            |
//!
//! Primary precedes secondary; each sub-list keeps its original rank
//! order. Duplicates are detected by hashing the first 100 characters
//! of content — fragments sharing that prefix collapse to the first
//! occurrence even when their full contents differ (a documented
//! approximation). An under-supplied candidate set yields fewer than
//! `k` results; that is a valid outcome, never padded and never an
//! error.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::intent::{analyze, IntentConfig};
use crate::models::{Fragment, OriginKind, QueryIntent};

/// Candidate sets must be requested at `OVER_FETCH_FACTOR × k`.
pub const OVER_FETCH_FACTOR: usize = 2;

/// Number of leading characters hashed for duplicate detection.
const DEDUP_PREFIX_CHARS: usize = 100;

/// The outcome of one retrieval call.
///
/// `fragments` is the final blended list (at most `k` entries). The
/// pre-dedup `primary` and `secondary` sub-lists are kept for
/// observability and are not persisted.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub fragments: Vec<Fragment>,
    pub intent: QueryIntent,
    pub primary: Vec<Fragment>,
    pub secondary: Vec<Fragment>,
}

impl RetrievalResult {
    /// Count final fragments of one origin, for diagnostics rendering.
    pub fn count_of(&self, origin: OriginKind) -> usize {
        self.fragments.iter().filter(|f| f.origin == origin).count()
    }
}

/// Blend an over-fetched candidate list into at most `k` fragments
/// according to the query's intent.
///
/// `candidates` must already be in similarity rank order (best first);
/// this function never re-scores, it only filters by origin, blends,
/// deduplicates, and truncates.
pub fn select(
    query: &str,
    candidates: &[Fragment],
    k: usize,
    config: &IntentConfig,
) -> RetrievalResult {
    let intent = analyze(query, config);

    let take = |origin: OriginKind, n: usize| -> Vec<Fragment> {
        candidates
            .iter()
            .filter(|f| f.origin == origin)
            .take(n)
            .cloned()
            .collect()
    };

    let favored = k.div_ceil(2) + 1;
    let (primary, secondary) = match intent {
        QueryIntent::CodeFirst => (take(OriginKind::Code, favored), take(OriginKind::Doc, k / 2)),
        QueryIntent::DocFirst => (take(OriginKind::Doc, favored), take(OriginKind::Code, k / 2)),
        QueryIntent::Balanced => {
            let mut blended = take(OriginKind::Doc, k / 2);
            blended.extend(take(OriginKind::Code, k / 2));
            (blended, Vec::new())
        }
    };

    let mut seen: HashSet<[u8; 32]> = HashSet::new();
    let mut fragments: Vec<Fragment> = Vec::new();
    for fragment in primary.iter().chain(secondary.iter()) {
        if fragments.len() == k {
            break;
        }
        if seen.insert(prefix_digest(&fragment.content)) {
            fragments.push(fragment.clone());
        }
    }

    RetrievalResult {
        fragments,
        intent,
        primary,
        secondary,
    }
}

/// Hash of the first [`DEDUP_PREFIX_CHARS`] characters of content.
fn prefix_digest(content: &str) -> [u8; 32] {
    let prefix: String = content.chars().take(DEDUP_PREFIX_CHARS).collect();
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hasher.finalize().into()
}
