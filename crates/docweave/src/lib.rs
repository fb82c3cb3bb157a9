//! # docweave
//!
//! A local-first engine that chunks, cross-links, and retrieves source
//! code and its documentation.
//!
//! docweave ingests two corpus roots — one of source code, one of prose
//! documentation — splits both into structure-aware fragments,
//! establishes name-equality cross-references between code scopes and
//! the doc sections that describe them, and serves intent-adaptive
//! retrieval over the combined index.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌──────────┐
//! │ Corpus scan  │──▶│ Chunk + Link    │──▶│  SQLite   │
//! │ code / docs  │   │ + Embed         │   │ + vectors │
//! └──────────────┘   └────────────────┘   └────┬─────┘
//!                                              │
//!                              query ──▶ intent ──▶ blend
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dw init                          # create database
//! dw sync                          # ingest and cross-link both corpora
//! dw query "how does chunking work internally?"
//! dw ask "how to use the loader?"  # retrieval + LLM answer
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`scan`] | Corpus scanning with per-file outcomes |
//! | [`ingest`] | Sync pipeline: chunk, link, store, embed |
//! | [`sqlite_store`] | SQLite fragment store |
//! | [`embedding`] | Embedding provider implementations |
//! | [`query`] | Intent-adaptive retrieval command |
//! | [`answer`] | Chat-completion answer command |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod answer;
pub mod config;
pub mod db;
pub mod embed_cmd;
pub mod embedding;
pub mod get;
pub mod ingest;
pub mod migrate;
pub mod query;
pub mod scan;
pub mod sources;
pub mod sqlite_store;
