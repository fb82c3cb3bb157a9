//! Retrieval command.
//!
//! Runs the full query path: embed the query, over-fetch candidates
//! from the vector store, and hand them to the core's intent-adaptive
//! selector. Rendering includes the intent label and per-origin counts
//! so the blend is observable.
//!
//! An empty corpus is reported distinctly from "no relevant results" —
//! the first means nothing was ever ingested, the second is a valid
//! zero-result search.

use anyhow::{bail, Result};

use docweave_core::intent::IntentConfig;
use docweave_core::models::{Fragment, OriginKind};
use docweave_core::select::{select, RetrievalResult, OVER_FETCH_FACTOR};
use docweave_core::store::{EmptyCorpus, FragmentStore};

use crate::config::Config;
use crate::db;
use crate::embedding;
use crate::sqlite_store::SqliteStore;

/// Core retrieval path shared by `dw query` and `dw ask`.
pub async fn retrieve(
    config: &Config,
    store: &SqliteStore,
    query: &str,
    k: usize,
    intent_config: &IntentConfig,
) -> Result<RetrievalResult> {
    if query.trim().is_empty() {
        bail!("query text is empty");
    }

    if store.fragment_count().await? == 0 {
        return Err(EmptyCorpus.into());
    }

    if !config.embedding.is_enabled() {
        bail!("query requires embeddings. Set [embedding] provider in config.");
    }

    let provider = embedding::create_provider(&config.embedding)?;
    let query_vec = embedding::embed_query(provider.as_ref(), &config.embedding, query).await?;

    let fetch = (OVER_FETCH_FACTOR * k) as i64;
    let scored = store.vector_search(&query_vec, fetch).await?;
    let candidates: Vec<Fragment> = scored.into_iter().map(|s| s.fragment).collect();

    Ok(select(query, &candidates, k, intent_config))
}

/// CLI entry point — retrieves and prints ranked fragments.
pub async fn run_query(config: &Config, query: &str, k_override: Option<usize>) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let intent_config = IntentConfig::default();
    let k = k_override.unwrap_or(config.retrieval.k);

    let result = match retrieve(config, &store, query, k, &intent_config).await {
        Ok(result) => result,
        Err(e) if e.downcast_ref::<EmptyCorpus>().is_some() => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    };

    render_result(&result);
    store.pool().close().await;
    Ok(())
}

/// Print a retrieval result with its blend diagnostics.
pub fn render_result(result: &RetrievalResult) {
    if result.fragments.is_empty() {
        println!("No results.");
        return;
    }

    println!("intent: {}", result.intent.as_str());
    println!(
        "results: {} ({} doc, {} code; primary {}, secondary {})",
        result.fragments.len(),
        result.count_of(OriginKind::Doc),
        result.count_of(OriginKind::Code),
        result.primary.len(),
        result.secondary.len(),
    );
    println!();

    for (i, fragment) in result.fragments.iter().enumerate() {
        println!(
            "{}. [{}] {} :: {} (lines {}-{})",
            i + 1,
            fragment.origin.as_str(),
            fragment.file,
            fragment.section,
            fragment.start_line,
            fragment.end_line
        );
        if !fragment.linked_ids.is_empty() {
            println!("    links: {}", fragment.linked_ids.join(", "));
        }
        println!("    excerpt: \"{}\"", excerpt(&fragment.content));
        println!("    id: {}", fragment.id);
        println!();
    }
}

fn excerpt(content: &str) -> String {
    let flattened = content.replace('\n', " ");
    let trimmed = flattened.trim();
    let cut: String = trimmed.chars().take(160).collect();
    if cut.len() < trimmed.len() {
        format!("{}...", cut)
    } else {
        cut
    }
}
