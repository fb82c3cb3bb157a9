//! Embedding backfill commands.
//!
//! `dw embed pending` embeds fragments whose vector is missing or whose
//! content changed since it was embedded; `dw embed rebuild` clears all
//! vectors and regenerates from scratch. Inline embedding during sync
//! reuses the same batch path and is non-fatal on failure.

use anyhow::{bail, Result};

use docweave_core::models::Fragment;
use docweave_core::store::FragmentStore;

use crate::config::Config;
use crate::db;
use crate::embedding;
use crate::sqlite_store::SqliteStore;

/// Find and embed fragments that are missing or have stale embeddings.
pub async fn run_embed_pending(
    config: &Config,
    limit: Option<usize>,
    batch_size_override: Option<usize>,
    dry_run: bool,
) -> Result<()> {
    if !config.embedding.is_enabled() {
        bail!("Embedding provider is disabled. Set [embedding] provider in config.");
    }

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let pending = store.fragments_pending_embedding(limit).await?;

    if dry_run {
        println!("embed pending (dry-run)");
        println!("  fragments needing embeddings: {}", pending.len());
        return Ok(());
    }

    if pending.is_empty() {
        println!("embed pending");
        println!("  all fragments up to date");
        return Ok(());
    }

    let total = pending.len();
    let (embedded, failed) = embed_batches(config, &store, &pending, batch_size_override).await;

    println!("embed pending");
    println!("  total pending: {}", total);
    println!("  embedded: {}", embedded);
    println!("  failed: {}", failed);

    store.pool().close().await;
    Ok(())
}

/// Delete all embeddings and regenerate for every fragment.
pub async fn run_embed_rebuild(config: &Config, batch_size_override: Option<usize>) -> Result<()> {
    if !config.embedding.is_enabled() {
        bail!("Embedding provider is disabled. Set [embedding] provider in config.");
    }

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);

    let cleared = store.clear_embeddings().await?;
    println!("embed rebuild — cleared {} existing embeddings", cleared);

    let all = store.fragments_pending_embedding(None).await?;
    if all.is_empty() {
        println!("  no fragments to embed");
        store.pool().close().await;
        return Ok(());
    }

    let total = all.len();
    let (embedded, failed) = embed_batches(config, &store, &all, batch_size_override).await;

    println!("embed rebuild");
    println!("  total fragments: {}", total);
    println!("  embedded: {}", embedded);
    println!("  failed: {}", failed);

    store.pool().close().await;
    Ok(())
}

/// Embed fragments during sync. Non-fatal: failures leave the vectors
/// pending for a later `dw embed pending`.
pub async fn embed_fragments_inline(
    config: &Config,
    store: &SqliteStore,
    fragments: &[Fragment],
) -> (u64, u64) {
    if !config.embedding.is_enabled() {
        return (0, 0);
    }

    // Only fragments whose vector is missing or stale need work.
    let pending = match store.fragments_pending_embedding(None).await {
        Ok(all_pending) => {
            let batch_ids: Vec<&str> = fragments.iter().map(|f| f.id.as_str()).collect();
            all_pending
                .into_iter()
                .filter(|f| batch_ids.contains(&f.id.as_str()))
                .collect::<Vec<_>>()
        }
        Err(e) => {
            eprintln!("Warning: could not list pending embeddings: {}", e);
            return (0, fragments.len() as u64);
        }
    };

    let (embedded, failed) = embed_batches(config, store, &pending, None).await;
    (embedded, failed)
}

async fn embed_batches(
    config: &Config,
    store: &SqliteStore,
    fragments: &[Fragment],
    batch_size_override: Option<usize>,
) -> (u64, u64) {
    let provider = match embedding::create_provider(&config.embedding) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Warning: could not create embedding provider: {}", e);
            return (0, fragments.len() as u64);
        }
    };

    let model_name = provider.model_name().to_string();
    let batch_size = batch_size_override.unwrap_or(config.embedding.batch_size);
    let mut embedded = 0u64;
    let mut failed = 0u64;

    for batch in fragments.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|f| f.content.clone()).collect();

        match embedding::embed_texts(provider.as_ref(), &config.embedding, &texts).await {
            Ok(vectors) => {
                for (fragment, vector) in batch.iter().zip(vectors.iter()) {
                    let result = store
                        .upsert_embedding(
                            &fragment.id,
                            vector,
                            &model_name,
                            provider.dims(),
                            &fragment.content_hash(),
                        )
                        .await;
                    match result {
                        Ok(()) => embedded += 1,
                        Err(e) => {
                            eprintln!("Warning: failed to store embedding for {}: {}", fragment.id, e);
                            failed += 1;
                        }
                    }
                }
            }
            Err(e) => {
                eprintln!("Warning: embedding batch failed: {}", e);
                failed += batch.len() as u64;
            }
        }
    }

    (embedded, failed)
}
