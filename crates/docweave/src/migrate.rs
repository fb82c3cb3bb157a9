use anyhow::Result;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // Create fragments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fragments (
            id TEXT PRIMARY KEY,
            file TEXT NOT NULL,
            origin TEXT NOT NULL,
            section TEXT NOT NULL,
            content TEXT NOT NULL,
            start_line INTEGER NOT NULL,
            end_line INTEGER NOT NULL,
            linked_ids TEXT NOT NULL DEFAULT '[]',
            content_hash TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Create fragment_vectors table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fragment_vectors (
            fragment_id TEXT PRIMARY KEY,
            embedding BLOB NOT NULL,
            model TEXT NOT NULL,
            dims INTEGER NOT NULL,
            content_hash TEXT NOT NULL,
            FOREIGN KEY (fragment_id) REFERENCES fragments(id)
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Create checkpoints table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS checkpoints (
            source TEXT PRIMARY KEY,
            cursor TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_fragments_file ON fragments(file)")
        .execute(&pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_fragments_origin ON fragments(origin)")
        .execute(&pool)
        .await?;

    pool.close().await;
    Ok(())
}
