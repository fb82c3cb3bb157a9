//! Storage abstraction for docweave.
//!
//! The [`FragmentStore`] trait defines the operations the retrieval
//! pipeline needs from a persistence backend, enabling pluggable
//! implementations (SQLite in the application, in-memory here for
//! tests). Fragments are handed to a store fully linked — the linker
//! runs over a whole batch before anything is published, so a store
//! never observes partially linked state.

pub mod memory;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Fragment;

/// A fragment returned from similarity search, with its raw score.
#[derive(Debug, Clone)]
pub struct ScoredFragment {
    pub fragment: Fragment,
    /// Raw cosine similarity from the search backend.
    pub score: f32,
}

/// Marker error: retrieval was invoked before any fragments were
/// indexed.
///
/// Distinct from an empty result list — callers must surface it to the
/// user as "nothing ingested yet", not as "no relevant results". Detect
/// it with `err.downcast_ref::<EmptyCorpus>()`.
#[derive(Debug, Clone, Copy)]
pub struct EmptyCorpus;

impl fmt::Display for EmptyCorpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no fragments are indexed yet — run `dw sync` before querying"
        )
    }
}

impl std::error::Error for EmptyCorpus {}

/// Abstract persistence backend for fragments and their vectors.
///
/// All operations are async (via `async-trait`); in-memory
/// implementations return immediately-ready futures.
#[async_trait]
pub trait FragmentStore: Send + Sync {
    /// Replace every fragment previously stored for `file` with the
    /// given, fully linked batch. Stale vectors for removed fragments
    /// are dropped.
    async fn replace_file(&self, file: &str, fragments: &[Fragment]) -> Result<()>;

    /// Rewrite the link list of an already-stored fragment.
    ///
    /// Used when re-linking an incrementally synced corpus changes the
    /// cross-references of fragments whose content did not change.
    async fn update_links(&self, fragment_id: &str, linked_ids: &[String]) -> Result<()>;

    /// Store or refresh the embedding vector for a fragment.
    async fn upsert_embedding(
        &self,
        fragment_id: &str,
        vector: &[f32],
        model: &str,
        dims: usize,
        content_hash: &str,
    ) -> Result<()>;

    /// Fetch one fragment by id.
    async fn get_fragment(&self, id: &str) -> Result<Option<Fragment>>;

    /// Every stored fragment, unordered.
    async fn all_fragments(&self) -> Result<Vec<Fragment>>;

    /// Total number of stored fragments.
    async fn fragment_count(&self) -> Result<i64>;

    /// Brute-force cosine similarity search over embedded fragments,
    /// best first.
    async fn vector_search(&self, query_vec: &[f32], limit: i64) -> Result<Vec<ScoredFragment>>;
}
