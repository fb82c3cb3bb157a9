//! # docweave CLI (`dw`)
//!
//! The `dw` binary is the primary interface for docweave. It provides
//! commands for database initialization, corpus ingestion, intent-aware
//! retrieval, answer generation, and embedding management.
//!
//! ## Usage
//!
//! ```bash
//! dw --config ./config/dw.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dw init` | Create the SQLite database and run schema migrations |
//! | `dw sources` | Show the configured corpus roots and their health |
//! | `dw sync` | Chunk, cross-link, and store both corpora |
//! | `dw query "<text>"` | Intent-adaptive retrieval over the index |
//! | `dw ask "<question>"` | Retrieval plus an LLM-generated answer |
//! | `dw get <id>` | Print one fragment by its deterministic id |
//! | `dw embed pending` | Backfill missing or stale embeddings |
//! | `dw embed rebuild` | Delete and regenerate all embeddings |

mod answer;
mod config;
mod db;
mod embed_cmd;
mod embedding;
mod get;
mod ingest;
mod migrate;
mod query;
mod scan;
mod sources;
mod sqlite_store;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docweave CLI — chunk, cross-link, and retrieve source code together
/// with its documentation.
///
/// All commands accept a `--config` flag pointing to a TOML
/// configuration file. See `config/dw.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "dw",
    about = "docweave — chunk, cross-link, and retrieve code and documentation",
    version,
    long_about = "docweave ingests a source-code corpus and a documentation corpus, splits both \
    into structure-aware fragments, cross-links code scopes with the doc sections that describe \
    them, and serves intent-adaptive retrieval (and LLM answers) over the combined index."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/dw.toml`. All corpus, database, retrieval,
    /// embedding, and answer settings are read from this file.
    #[arg(long, global = true, default_value = "./config/dw.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables
    /// (fragments, fragment_vectors, checkpoints). Idempotent — running
    /// it multiple times is safe.
    Init,

    /// Show the configured corpus roots and their health.
    Sources,

    /// Ingest both corpus roots.
    ///
    /// Scans the code and documentation roots, chunks changed files
    /// into fragments, recomputes cross-references over the whole
    /// corpus, stores everything, and (if configured) embeds inline.
    Sync {
        /// Ignore the checkpoint — re-chunk every file from scratch.
        #[arg(long)]
        full: bool,

        /// Show file and fragment counts without writing to the database.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of changed files to process.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Retrieve fragments for a query.
    ///
    /// Classifies the query intent (code-first, doc-first, balanced),
    /// over-fetches candidates from the vector index, blends by type,
    /// and prints the ranked fragments with diagnostics.
    Query {
        /// The query text.
        query: String,

        /// Number of fragments to return (defaults to retrieval.k).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Answer a question over the corpus.
    ///
    /// Runs the same retrieval as `query`, then asks the configured
    /// chat-completion backend for an answer grounded in the retrieved
    /// fragments.
    Ask {
        /// The question text.
        question: String,

        /// Number of fragments to use as context (defaults to retrieval.k).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Print one fragment by its deterministic id.
    Get {
        /// Fragment id (`<file>:<section>:<start_line>`).
        id: String,
    },

    /// Manage embedding vectors.
    ///
    /// Requires an embedding provider (e.g., OpenAI) to be configured.
    Embed {
        #[command(subcommand)]
        action: EmbedAction,
    },
}

/// Embedding management subcommands.
#[derive(Subcommand)]
enum EmbedAction {
    /// Embed fragments that are missing or have stale embeddings.
    Pending {
        /// Maximum number of fragments to embed in this run.
        #[arg(long)]
        limit: Option<usize>,

        /// Override the batch size from config (texts per API call).
        #[arg(long)]
        batch_size: Option<usize>,

        /// Show counts without performing any embedding.
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete and regenerate all embeddings.
    ///
    /// Useful when switching embedding models or dimensions.
    Rebuild {
        /// Override the batch size from config (texts per API call).
        #[arg(long)]
        batch_size: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Sync {
            full,
            dry_run,
            limit,
        } => {
            ingest::run_sync(&cfg, full, dry_run, limit).await?;
        }
        Commands::Query { query, k } => {
            query::run_query(&cfg, &query, k).await?;
        }
        Commands::Ask { question, k } => {
            answer::run_ask(&cfg, &question, k).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
        Commands::Embed { action } => match action {
            EmbedAction::Pending {
                limit,
                batch_size,
                dry_run,
            } => {
                embed_cmd::run_embed_pending(&cfg, limit, batch_size, dry_run).await?;
            }
            EmbedAction::Rebuild { batch_size } => {
                embed_cmd::run_embed_rebuild(&cfg, batch_size).await?;
            }
        },
    }

    Ok(())
}
