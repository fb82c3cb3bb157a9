//! # docweave core
//!
//! Shared logic for docweave: the fragment data model, the structural
//! code and document chunkers, the cross-reference linker, the query
//! intent analyzer, the adaptive retrieval selector, the store
//! abstraction, and the embedding trait.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. Everything in it is a pure function of its
//! inputs, with one exception: [`linker::link`] mutates `linked_ids` in
//! place on the fragments it is given.

pub mod chunker;
pub mod code_chunker;
pub mod doc_chunker;
pub mod embedding;
pub mod intent;
pub mod linker;
pub mod models;
pub mod select;
pub mod store;
