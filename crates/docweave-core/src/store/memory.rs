//! In-memory [`FragmentStore`] implementation for tests.
//!
//! Fragments and vectors live in `Vec`s behind `std::sync::RwLock`.
//! Vector search is brute-force cosine similarity over all stored
//! vectors.

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::Fragment;

use super::{FragmentStore, ScoredFragment};

struct StoredVector {
    fragment_id: String,
    vector: Vec<f32>,
    _model: String,
    _dims: usize,
    _content_hash: String,
}

/// In-memory store for tests and examples.
pub struct InMemoryStore {
    fragments: RwLock<Vec<Fragment>>,
    vectors: RwLock<Vec<StoredVector>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            fragments: RwLock::new(Vec::new()),
            vectors: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FragmentStore for InMemoryStore {
    async fn replace_file(&self, file: &str, fragments: &[Fragment]) -> Result<()> {
        let mut stored = self.fragments.write().unwrap();
        let removed: Vec<String> = stored
            .iter()
            .filter(|f| f.file == file)
            .map(|f| f.id.clone())
            .collect();
        stored.retain(|f| f.file != file);
        stored.extend(fragments.iter().cloned());
        drop(stored);

        let mut vectors = self.vectors.write().unwrap();
        vectors.retain(|v| !removed.contains(&v.fragment_id));
        Ok(())
    }

    async fn update_links(&self, fragment_id: &str, linked_ids: &[String]) -> Result<()> {
        let mut stored = self.fragments.write().unwrap();
        if let Some(fragment) = stored.iter_mut().find(|f| f.id == fragment_id) {
            fragment.linked_ids = linked_ids.to_vec();
        }
        Ok(())
    }

    async fn upsert_embedding(
        &self,
        fragment_id: &str,
        vector: &[f32],
        model: &str,
        dims: usize,
        content_hash: &str,
    ) -> Result<()> {
        let mut vectors = self.vectors.write().unwrap();
        vectors.retain(|v| v.fragment_id != fragment_id);
        vectors.push(StoredVector {
            fragment_id: fragment_id.to_string(),
            vector: vector.to_vec(),
            _model: model.to_string(),
            _dims: dims,
            _content_hash: content_hash.to_string(),
        });
        Ok(())
    }

    async fn get_fragment(&self, id: &str) -> Result<Option<Fragment>> {
        let stored = self.fragments.read().unwrap();
        Ok(stored.iter().find(|f| f.id == id).cloned())
    }

    async fn all_fragments(&self) -> Result<Vec<Fragment>> {
        Ok(self.fragments.read().unwrap().clone())
    }

    async fn fragment_count(&self) -> Result<i64> {
        Ok(self.fragments.read().unwrap().len() as i64)
    }

    async fn vector_search(&self, query_vec: &[f32], limit: i64) -> Result<Vec<ScoredFragment>> {
        let vectors = self.vectors.read().unwrap();
        let fragments = self.fragments.read().unwrap();

        let mut scored: Vec<ScoredFragment> = vectors
            .iter()
            .filter_map(|sv| {
                let fragment = fragments.iter().find(|f| f.id == sv.fragment_id)?;
                Some(ScoredFragment {
                    fragment: fragment.clone(),
                    score: cosine_similarity(query_vec, &sv.vector),
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit as usize);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OriginKind;

    fn fragment(file: &str, section: &str, content: &str) -> Fragment {
        Fragment::new(OriginKind::Code, file, section, content, 1, 2).unwrap()
    }

    #[tokio::test]
    async fn test_replace_file_drops_old_fragments_and_vectors() {
        let store = InMemoryStore::new();
        let old = fragment("a.py", "old", "def old(): pass");
        store.replace_file("a.py", &[old.clone()]).await.unwrap();
        store
            .upsert_embedding(&old.id, &[1.0, 0.0], "m", 2, "h")
            .await
            .unwrap();

        let new = fragment("a.py", "new", "def new(): pass");
        store.replace_file("a.py", &[new.clone()]).await.unwrap();

        assert!(store.get_fragment(&old.id).await.unwrap().is_none());
        assert!(store.get_fragment(&new.id).await.unwrap().is_some());
        // The removed fragment's vector no longer matches anything.
        let hits = store.vector_search(&[1.0, 0.0], 10).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_vector_search_orders_by_similarity() {
        let store = InMemoryStore::new();
        let a = fragment("a.py", "a", "alpha body");
        let b = fragment("b.py", "b", "beta body");
        store.replace_file("a.py", &[a.clone()]).await.unwrap();
        store.replace_file("b.py", &[b.clone()]).await.unwrap();
        store
            .upsert_embedding(&a.id, &[1.0, 0.0], "m", 2, "h")
            .await
            .unwrap();
        store
            .upsert_embedding(&b.id, &[0.0, 1.0], "m", 2, "h")
            .await
            .unwrap();

        let hits = store.vector_search(&[0.1, 0.9], 10).await.unwrap();
        assert_eq!(hits[0].fragment.id, b.id);
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_update_links_rewrites_in_place() {
        let store = InMemoryStore::new();
        let f = fragment("a.py", "f", "def f(): pass");
        store.replace_file("a.py", &[f.clone()]).await.unwrap();
        store
            .update_links(&f.id, &["doc.md:Guide:1".to_string()])
            .await
            .unwrap();
        let got = store.get_fragment(&f.id).await.unwrap().unwrap();
        assert_eq!(got.linked_ids, vec!["doc.md:Guide:1"]);
    }

    #[tokio::test]
    async fn test_count_tracks_replacements() {
        let store = InMemoryStore::new();
        assert_eq!(store.fragment_count().await.unwrap(), 0);
        let f1 = fragment("a.py", "one", "def one(): pass");
        let f2 = fragment("a.py", "two", "def two(): pass");
        store.replace_file("a.py", &[f1, f2]).await.unwrap();
        assert_eq!(store.fragment_count().await.unwrap(), 2);
    }
}
