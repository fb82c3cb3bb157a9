//! Corpus scanner.
//!
//! Walks the configured code and documentation roots, applies
//! include/exclude globs, and loads each matching file as UTF-8 text.
//! Every file produces an explicit per-file outcome — loaded with its
//! text, or skipped with a reason — so a single undecodable file never
//! aborts a sync.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use walkdir::WalkDir;

use docweave_core::models::OriginKind;

use crate::config::Config;

/// Files shorter than this after stripping are skipped as content-free.
const MIN_CONTENT_BYTES: usize = 10;

/// A corpus file successfully loaded as text.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Path relative to its corpus root, prefixed with the corpus kind
    /// (`code/...` or `docs/...`) so the two roots cannot collide.
    pub path: String,
    pub origin: OriginKind,
    pub text: String,
    /// Modification time (Unix seconds), for incremental sync.
    pub mtime: i64,
}

/// Per-file scan outcome. Skips are data, not errors.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Loaded(ScannedFile),
    Skipped { path: String, reason: String },
}

/// Scan both corpus roots, returning deterministic (path-sorted)
/// per-file outcomes.
pub fn scan_corpus(config: &Config) -> Result<Vec<FileOutcome>> {
    let corpus = &config.corpus;

    if !corpus.code_root.exists() {
        bail!("corpus.code_root does not exist: {}", corpus.code_root.display());
    }
    if !corpus.doc_root.exists() {
        bail!("corpus.doc_root does not exist: {}", corpus.doc_root.display());
    }

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(corpus.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut outcomes = Vec::new();
    scan_root(
        &corpus.code_root,
        OriginKind::Code,
        "code",
        &build_globset(&corpus.code_globs)?,
        &exclude_set,
        corpus.follow_symlinks,
        &mut outcomes,
    )?;
    scan_root(
        &corpus.doc_root,
        OriginKind::Doc,
        "docs",
        &build_globset(&corpus.doc_globs)?,
        &exclude_set,
        corpus.follow_symlinks,
        &mut outcomes,
    )?;

    outcomes.sort_by(|a, b| outcome_path(a).cmp(outcome_path(b)));
    Ok(outcomes)
}

fn outcome_path(outcome: &FileOutcome) -> &str {
    match outcome {
        FileOutcome::Loaded(f) => &f.path,
        FileOutcome::Skipped { path, .. } => path,
    }
}

fn scan_root(
    root: &Path,
    origin: OriginKind,
    prefix: &str,
    include_set: &GlobSet,
    exclude_set: &GlobSet,
    follow_symlinks: bool,
    outcomes: &mut Vec<FileOutcome>,
) -> Result<()> {
    let walker = WalkDir::new(root).follow_links(follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        let file_id = format!("{}/{}", prefix, rel_str);
        outcomes.push(load_file(path, &file_id, origin));
    }
    Ok(())
}

fn load_file(path: &Path, file_id: &str, origin: OriginKind) -> FileOutcome {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            return FileOutcome::Skipped {
                path: file_id.to_string(),
                reason: format!("unreadable: {}", e),
            }
        }
    };

    if bytes.is_empty() {
        return FileOutcome::Skipped {
            path: file_id.to_string(),
            reason: "empty file".to_string(),
        };
    }

    let text = match String::from_utf8(bytes) {
        Ok(t) => t,
        Err(_) => {
            return FileOutcome::Skipped {
                path: file_id.to_string(),
                reason: "not valid UTF-8".to_string(),
            }
        }
    };

    if text.trim().len() < MIN_CONTENT_BYTES {
        return FileOutcome::Skipped {
            path: file_id.to_string(),
            reason: "below minimum content length".to_string(),
        };
    }

    let mtime = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(std::time::SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    FileOutcome::Loaded(ScannedFile {
        path: file_id.to_string(),
        origin,
        text,
        mtime,
    })
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
