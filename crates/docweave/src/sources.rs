use anyhow::Result;

use crate::config::Config;

pub fn list_sources(config: &Config) -> Result<()> {
    let corpus = &config.corpus;

    println!("{:<8} {:<40} HEALTHY", "CORPUS", "ROOT");

    let code_ok = corpus.code_root.exists();
    println!(
        "{:<8} {:<40} {}",
        "code",
        corpus.code_root.display().to_string(),
        code_ok
    );

    let doc_ok = corpus.doc_root.exists();
    println!(
        "{:<8} {:<40} {}",
        "docs",
        corpus.doc_root.display().to_string(),
        doc_ok
    );

    println!();
    println!("code globs: {}", corpus.code_globs.join(", "));
    println!("doc globs:  {}", corpus.doc_globs.join(", "));

    Ok(())
}
