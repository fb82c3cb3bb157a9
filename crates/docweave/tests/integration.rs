//! End-to-end tests driving the compiled `dw` binary.
//!
//! Each test builds a temp workspace with a small code corpus, a small
//! documentation corpus, and a generated config file, then runs CLI
//! commands against it and asserts on their output. No network access
//! is needed: the embedding and answer providers stay disabled.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn dw_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("dw");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();

    let code_dir = root.join("code");
    fs::create_dir_all(&code_dir).unwrap();
    fs::write(
        code_dir.join("sample.py"),
        "def greet():\n    print(\"hello\")\n\nclass Loader:\n    def load(self):\n        return 1\n",
    )
    .unwrap();

    let docs_dir = root.join("docs");
    fs::create_dir_all(&docs_dir).unwrap();
    fs::write(
        docs_dir.join("guide.md"),
        "# Guide\n\n## greet\n\nThe greet function prints a greeting.\n\n## Loader\n\n### load\n\nHow load works.\n",
    )
    .unwrap();

    let config_content = format!(
        r#"[db]
path = "{root}/data/dw.sqlite"

[corpus]
code_root = "{root}/code"
doc_root = "{root}/docs"

[retrieval]
k = 6
"#,
        root = root.display()
    );

    let config_path = config_dir.join("dw.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_dw(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = dw_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run dw binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_dw(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_dw(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_dw(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_sync_chunks_and_links_both_corpora() {
    let (_tmp, config_path) = setup_test_env();

    run_dw(&config_path, &["init"]);
    let (stdout, stderr, success) = run_dw(&config_path, &["sync"]);
    assert!(success, "sync failed: stdout={}, stderr={}", stdout, stderr);

    // 3 code scopes (greet, Loader, Loader.load) + 4 doc sections
    // (Guide, Guide > greet, Guide > Loader, Guide > Loader > load).
    assert!(stdout.contains("fragments written: 7 (3 code, 4 doc)"), "stdout: {}", stdout);
    // greet, Loader, and Loader.load each match a doc section by name.
    assert!(stdout.contains("cross-references: 3 pairs"), "stdout: {}", stdout);
    assert!(stdout.contains("ok"));
}

#[test]
fn test_sync_dry_run_writes_nothing() {
    let (_tmp, config_path) = setup_test_env();

    run_dw(&config_path, &["init"]);
    let (stdout, _, success) = run_dw(&config_path, &["sync", "--dry-run"]);
    assert!(success);
    assert!(stdout.contains("dry-run"));
    assert!(stdout.contains("estimated fragments: 3 code, 4 doc"), "stdout: {}", stdout);

    // Nothing was written, so querying still reports an empty corpus.
    let (_, stderr, success) = run_dw(&config_path, &["query", "greet"]);
    assert!(!success);
    assert!(stderr.contains("no fragments are indexed"), "stderr: {}", stderr);
}

#[test]
fn test_sync_incremental_skips_unchanged_files() {
    let (_tmp, config_path) = setup_test_env();

    run_dw(&config_path, &["init"]);
    run_dw(&config_path, &["sync"]);

    let (stdout, _, success) = run_dw(&config_path, &["sync"]);
    assert!(success);
    assert!(stdout.contains("files changed: 0"), "stdout: {}", stdout);

    // --full re-chunks everything regardless of the checkpoint.
    let (stdout, _, success) = run_dw(&config_path, &["sync", "--full"]);
    assert!(success);
    assert!(stdout.contains("fragments written: 7"), "stdout: {}", stdout);
}

#[test]
fn test_sync_skips_undecodable_file() {
    let (tmp, config_path) = setup_test_env();

    fs::write(tmp.path().join("code").join("blob.py"), [0xFFu8, 0xFE, 0x00, 0x42]).unwrap();

    run_dw(&config_path, &["init"]);
    let (stdout, stderr, success) = run_dw(&config_path, &["sync"]);
    assert!(success, "sync must not abort on a bad file: {}", stderr);
    assert!(stderr.contains("skipped code/blob.py"), "stderr: {}", stderr);
    assert!(stderr.contains("not valid UTF-8"), "stderr: {}", stderr);
    assert!(stdout.contains("skipped: 1"), "stdout: {}", stdout);
}

#[test]
fn test_sync_skips_content_free_file() {
    let (tmp, config_path) = setup_test_env();

    fs::write(tmp.path().join("docs").join("stub.md"), "x\n").unwrap();

    run_dw(&config_path, &["init"]);
    let (_, stderr, success) = run_dw(&config_path, &["sync"]);
    assert!(success);
    assert!(stderr.contains("below minimum content length"), "stderr: {}", stderr);
}

#[test]
fn test_query_before_sync_reports_empty_corpus() {
    let (_tmp, config_path) = setup_test_env();

    run_dw(&config_path, &["init"]);
    let (_, stderr, success) = run_dw(&config_path, &["query", "how does greet work?"]);
    assert!(!success, "empty corpus must not look like a zero-result success");
    assert!(stderr.contains("no fragments are indexed"), "stderr: {}", stderr);
    assert!(stderr.contains("dw sync"), "stderr should point at sync: {}", stderr);
}

#[test]
fn test_query_requires_embedding_provider() {
    let (_tmp, config_path) = setup_test_env();

    run_dw(&config_path, &["init"]);
    run_dw(&config_path, &["sync"]);

    let (_, stderr, success) = run_dw(&config_path, &["query", "how does greet work?"]);
    assert!(!success);
    assert!(stderr.contains("requires embeddings"), "stderr: {}", stderr);
}

#[test]
fn test_ask_requires_answer_provider() {
    let (_tmp, config_path) = setup_test_env();

    run_dw(&config_path, &["init"]);
    run_dw(&config_path, &["sync"]);

    let (_, stderr, success) = run_dw(&config_path, &["ask", "how to use greet?"]);
    assert!(!success);
    assert!(stderr.contains("Answer backend is disabled"), "stderr: {}", stderr);
}

#[test]
fn test_get_fragment_shows_links() {
    let (_tmp, config_path) = setup_test_env();

    run_dw(&config_path, &["init"]);
    run_dw(&config_path, &["sync"]);

    // Fragment ids are deterministic: <file>:<section>:<start_line>.
    let (stdout, stderr, success) = run_dw(&config_path, &["get", "code/sample.py:greet:1"]);
    assert!(success, "get failed: {}", stderr);
    assert!(stdout.contains("origin:     code"));
    assert!(stdout.contains("section:    greet"));
    assert!(stdout.contains("lines:      1-3"), "stdout: {}", stdout);
    assert!(
        stdout.contains("docs/guide.md:Guide > greet:3"),
        "cross-reference missing: {}",
        stdout
    );
    assert!(stdout.contains("def greet():"));
}

#[test]
fn test_get_links_are_symmetric() {
    let (_tmp, config_path) = setup_test_env();

    run_dw(&config_path, &["init"]);
    run_dw(&config_path, &["sync"]);

    let (stdout, _, success) = run_dw(&config_path, &["get", "docs/guide.md:Guide > greet:3"]);
    assert!(success);
    assert!(stdout.contains("origin:     doc"));
    assert!(
        stdout.contains("code/sample.py:greet:1"),
        "reverse link missing: {}",
        stdout
    );
}

#[test]
fn test_get_unknown_id_fails_distinctly() {
    let (_tmp, config_path) = setup_test_env();

    run_dw(&config_path, &["init"]);
    let (_, stderr, success) = run_dw(&config_path, &["get", "nope.py:missing:1"]);
    assert!(!success);
    assert!(stderr.contains("fragment not found"));
}

#[test]
fn test_sources_lists_corpus_roots() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_dw(&config_path, &["sources"]);
    assert!(success);
    assert!(stdout.contains("code"));
    assert!(stdout.contains("docs"));
    assert!(stdout.contains("true"));
}

#[test]
fn test_sync_relinks_when_doc_section_added() {
    let (tmp, config_path) = setup_test_env();

    run_dw(&config_path, &["init"]);
    run_dw(&config_path, &["sync"]);

    // New code file introduces a scope documented nowhere yet.
    fs::write(
        tmp.path().join("code").join("extra.py"),
        "def teardown():\n    pass\n",
    )
    .unwrap();
    let (stdout, _, success) = run_dw(&config_path, &["sync", "--full"]);
    assert!(success, "stdout: {}", stdout);

    // Document it; the next sync must link the existing code fragment.
    fs::write(
        tmp.path().join("docs").join("extra.md"),
        "# Extras\n\n## teardown\n\nStops everything cleanly.\n",
    )
    .unwrap();
    let (stdout, _, success) = run_dw(&config_path, &["sync", "--full"]);
    assert!(success, "stdout: {}", stdout);
    assert!(stdout.contains("cross-references: 4 pairs"), "stdout: {}", stdout);

    let (stdout, _, success) = run_dw(&config_path, &["get", "code/extra.py:teardown:1"]);
    assert!(success);
    assert!(
        stdout.contains("docs/extra.md:Extras > teardown:3"),
        "new link missing: {}",
        stdout
    );
}
