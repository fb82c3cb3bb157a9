//! Ingestion pipeline orchestration.
//!
//! Coordinates the full sync flow: corpus scan → per-file chunking →
//! whole-corpus cross-reference linking → storage → optional inline
//! embedding. Linking always runs over the complete fragment set
//! (changed files merged with what is already stored) and completes
//! before any fragment is written, so the store never observes
//! partially linked state. Incremental sync skips re-chunking files
//! older than the checkpoint; `--full` ignores it.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use sqlx::SqlitePool;

use docweave_core::chunker::ChunkerConfig;
use docweave_core::code_chunker::chunk_code;
use docweave_core::doc_chunker::chunk_doc;
use docweave_core::linker::link;
use docweave_core::models::{Fragment, OriginKind};
use docweave_core::store::FragmentStore;

use crate::config::Config;
use crate::db;
use crate::embed_cmd;
use crate::scan::{self, FileOutcome, ScannedFile};
use crate::sqlite_store::SqliteStore;

const CHECKPOINT_SOURCE: &str = "corpus";

pub async fn run_sync(
    config: &Config,
    full: bool,
    dry_run: bool,
    limit: Option<usize>,
) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());

    let outcomes = scan::scan_corpus(config)?;
    let mut loaded: Vec<ScannedFile> = Vec::new();
    let mut skipped = 0usize;
    for outcome in outcomes {
        match outcome {
            FileOutcome::Loaded(file) => loaded.push(file),
            FileOutcome::Skipped { path, reason } => {
                eprintln!("  skipped {}: {}", path, reason);
                skipped += 1;
            }
        }
    }
    let scanned = loaded.len();

    let checkpoint: Option<i64> = if full {
        None
    } else {
        get_checkpoint(&pool, CHECKPOINT_SOURCE).await?
    };

    let mut changed: Vec<ScannedFile> = match checkpoint {
        Some(cp) => loaded.into_iter().filter(|f| f.mtime > cp).collect(),
        None => loaded,
    };
    if let Some(lim) = limit {
        changed.truncate(lim);
    }

    let chunker_config = ChunkerConfig::default();

    if dry_run {
        let mut code_count = 0usize;
        let mut doc_count = 0usize;
        for file in &changed {
            match file.origin {
                OriginKind::Code => code_count += chunk_code(&file.text, &file.path, &chunker_config).len(),
                OriginKind::Doc => doc_count += chunk_doc(&file.text, &file.path, &chunker_config).len(),
            }
        }
        println!("sync (dry-run)");
        println!("  files scanned: {} (skipped: {})", scanned, skipped);
        println!("  files changed: {}", changed.len());
        println!("  estimated fragments: {} code, {} doc", code_count, doc_count);
        pool.close().await;
        return Ok(());
    }

    // Chunk each changed file, keeping the per-file grouping for storage.
    let mut new_by_file: Vec<(String, Vec<Fragment>)> = Vec::new();
    for file in &changed {
        let fragments = match file.origin {
            OriginKind::Code => chunk_code(&file.text, &file.path, &chunker_config),
            OriginKind::Doc => chunk_doc(&file.text, &file.path, &chunker_config),
        };
        new_by_file.push((file.path.clone(), fragments));
    }

    // Merge with fragments already stored for unchanged files, then
    // recompute the cross-reference join over the whole corpus.
    let changed_paths: HashSet<&str> = changed.iter().map(|f| f.path.as_str()).collect();
    let prior: Vec<Fragment> = store
        .all_fragments()
        .await?
        .into_iter()
        .filter(|f| !changed_paths.contains(f.file.as_str()))
        .collect();
    let prior_links: HashMap<String, Vec<String>> = prior
        .iter()
        .map(|f| (f.id.clone(), f.linked_ids.clone()))
        .collect();

    let mut code_fragments: Vec<Fragment> = Vec::new();
    let mut doc_fragments: Vec<Fragment> = Vec::new();
    for (_, fragments) in &new_by_file {
        for fragment in fragments {
            match fragment.origin {
                OriginKind::Code => code_fragments.push(fragment.clone()),
                OriginKind::Doc => doc_fragments.push(fragment.clone()),
            }
        }
    }
    for mut fragment in prior {
        // The join is recomputed from scratch each sync, so stale links
        // to removed sections do not survive.
        fragment.linked_ids.clear();
        match fragment.origin {
            OriginKind::Code => code_fragments.push(fragment),
            OriginKind::Doc => doc_fragments.push(fragment),
        }
    }

    link(&mut code_fragments, &mut doc_fragments);
    let link_pairs: usize = code_fragments.iter().map(|f| f.linked_ids.len()).sum();

    let linked: HashMap<String, Fragment> = code_fragments
        .into_iter()
        .chain(doc_fragments)
        .map(|f| (f.id.clone(), f))
        .collect();

    // Write changed files, fully linked.
    let mut fragments_written = 0usize;
    let mut code_written = 0usize;
    let mut new_fragments: Vec<Fragment> = Vec::new();
    for (path, fragments) in &new_by_file {
        let final_fragments: Vec<Fragment> = fragments
            .iter()
            .map(|f| linked[&f.id].clone())
            .collect();
        store.replace_file(path, &final_fragments).await?;
        fragments_written += final_fragments.len();
        code_written += final_fragments
            .iter()
            .filter(|f| f.origin == OriginKind::Code)
            .count();
        new_fragments.extend(final_fragments);
    }

    // Rewrite links on unchanged fragments whose cross-references moved.
    let mut links_updated = 0usize;
    for (id, old_links) in &prior_links {
        let new_links = &linked[id].linked_ids;
        if new_links != old_links {
            store.update_links(id, new_links).await?;
            links_updated += 1;
        }
    }

    // Inline embedding (non-fatal).
    let (embedded, pending) = embed_cmd::embed_fragments_inline(config, &store, &new_fragments).await;

    // Advance the checkpoint to the newest processed file.
    let mut max_mtime = checkpoint.unwrap_or(0);
    for file in &changed {
        if file.mtime > max_mtime {
            max_mtime = file.mtime;
        }
    }
    set_checkpoint(&pool, CHECKPOINT_SOURCE, max_mtime).await?;

    println!("sync");
    println!("  files scanned: {} (skipped: {})", scanned, skipped);
    println!("  files changed: {}", changed.len());
    println!(
        "  fragments written: {} ({} code, {} doc)",
        fragments_written,
        code_written,
        fragments_written - code_written
    );
    println!("  cross-references: {} pairs", link_pairs);
    if links_updated > 0 {
        println!("  links rewritten on unchanged fragments: {}", links_updated);
    }
    if config.embedding.is_enabled() {
        println!("  embeddings written: {}", embedded);
        println!("  embeddings pending: {}", pending);
    }
    println!("  checkpoint: {}", max_mtime);
    println!("ok");

    pool.close().await;
    Ok(())
}

async fn get_checkpoint(pool: &SqlitePool, source: &str) -> Result<Option<i64>> {
    let result: Option<String> =
        sqlx::query_scalar("SELECT cursor FROM checkpoints WHERE source = ?")
            .bind(source)
            .fetch_optional(pool)
            .await?;

    Ok(result.and_then(|s| s.parse::<i64>().ok()))
}

async fn set_checkpoint(pool: &SqlitePool, source: &str, cursor_val: i64) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    sqlx::query(
        r#"
        INSERT INTO checkpoints (source, cursor, updated_at) VALUES (?, ?, ?)
        ON CONFLICT(source) DO UPDATE SET cursor = excluded.cursor, updated_at = excluded.updated_at
        "#,
    )
    .bind(source)
    .bind(cursor_val.to_string())
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}
