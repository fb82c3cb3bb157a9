//! Fragment retrieval by id.
//!
//! Fetches one fragment and prints its provenance, span, links, and
//! verbatim content. Used by the `dw get` CLI command.

use anyhow::Result;

use docweave_core::store::FragmentStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);

    let fragment = match store.get_fragment(id).await? {
        Some(fragment) => fragment,
        None => {
            eprintln!("Error: fragment not found: {}", id);
            std::process::exit(1);
        }
    };

    println!("--- Fragment ---");
    println!("id:         {}", fragment.id);
    println!("origin:     {}", fragment.origin.as_str());
    println!("file:       {}", fragment.file);
    println!("section:    {}", fragment.section);
    println!("lines:      {}-{}", fragment.start_line, fragment.end_line);
    if fragment.linked_ids.is_empty() {
        println!("links:      (none)");
    } else {
        println!("links:      {}", fragment.linked_ids.join(", "));
    }
    println!();
    println!("--- Content ---");
    println!("{}", fragment.content);

    store.pool().close().await;
    Ok(())
}
