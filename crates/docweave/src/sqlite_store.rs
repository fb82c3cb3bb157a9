//! SQLite-backed [`FragmentStore`] implementation.
//!
//! Fragments live in the `fragments` table with their link lists stored
//! as JSON arrays; embedding vectors live in `fragment_vectors` as
//! little-endian f32 BLOBs. Vector search fetches all stored vectors
//! and computes cosine similarity in Rust.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use docweave_core::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use docweave_core::models::{Fragment, OriginKind};
use docweave_core::store::{FragmentStore, ScoredFragment};

/// SQLite implementation of the [`FragmentStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Fragments whose vector is missing or stale (content hash no
    /// longer matches the stored embedding's hash).
    pub async fn fragments_pending_embedding(&self, limit: Option<usize>) -> Result<Vec<Fragment>> {
        let rows = sqlx::query(
            r#"
            SELECT f.id, f.file, f.origin, f.section, f.content,
                   f.start_line, f.end_line, f.linked_ids
            FROM fragments f
            LEFT JOIN fragment_vectors v ON v.fragment_id = f.id
            WHERE v.fragment_id IS NULL OR v.content_hash != f.content_hash
            ORDER BY f.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut fragments: Vec<Fragment> = rows.iter().map(row_to_fragment).collect::<Result<_>>()?;
        if let Some(lim) = limit {
            fragments.truncate(lim);
        }
        Ok(fragments)
    }

    /// Delete every stored vector (used by `dw embed rebuild`).
    pub async fn clear_embeddings(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM fragment_vectors")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn row_to_fragment(row: &sqlx::sqlite::SqliteRow) -> Result<Fragment> {
    let origin_str: String = row.get("origin");
    let origin = OriginKind::parse(&origin_str)
        .ok_or_else(|| anyhow::anyhow!("unknown origin kind in store: {}", origin_str))?;
    let linked_json: String = row.get("linked_ids");
    let linked_ids: Vec<String> = serde_json::from_str(&linked_json).unwrap_or_default();
    let start_line: i64 = row.get("start_line");
    let end_line: i64 = row.get("end_line");

    Ok(Fragment {
        id: row.get("id"),
        origin,
        file: row.get("file"),
        section: row.get("section"),
        content: row.get("content"),
        start_line: start_line as usize,
        end_line: end_line as usize,
        linked_ids,
    })
}

#[async_trait]
impl FragmentStore for SqliteStore {
    async fn replace_file(&self, file: &str, fragments: &[Fragment]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM fragment_vectors WHERE fragment_id IN (SELECT id FROM fragments WHERE file = ?)",
        )
        .bind(file)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM fragments WHERE file = ?")
            .bind(file)
            .execute(&mut *tx)
            .await?;

        for fragment in fragments {
            let linked_json = serde_json::to_string(&fragment.linked_ids)?;
            sqlx::query(
                r#"
                INSERT INTO fragments (id, file, origin, section, content,
                                       start_line, end_line, linked_ids, content_hash)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&fragment.id)
            .bind(&fragment.file)
            .bind(fragment.origin.as_str())
            .bind(&fragment.section)
            .bind(&fragment.content)
            .bind(fragment.start_line as i64)
            .bind(fragment.end_line as i64)
            .bind(&linked_json)
            .bind(fragment.content_hash())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_links(&self, fragment_id: &str, linked_ids: &[String]) -> Result<()> {
        let linked_json = serde_json::to_string(linked_ids)?;
        sqlx::query("UPDATE fragments SET linked_ids = ? WHERE id = ?")
            .bind(&linked_json)
            .bind(fragment_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_embedding(
        &self,
        fragment_id: &str,
        vector: &[f32],
        model: &str,
        dims: usize,
        content_hash: &str,
    ) -> Result<()> {
        let blob = vec_to_blob(vector);
        sqlx::query(
            r#"
            INSERT INTO fragment_vectors (fragment_id, embedding, model, dims, content_hash)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(fragment_id) DO UPDATE SET
                embedding = excluded.embedding,
                model = excluded.model,
                dims = excluded.dims,
                content_hash = excluded.content_hash
            "#,
        )
        .bind(fragment_id)
        .bind(&blob)
        .bind(model)
        .bind(dims as i64)
        .bind(content_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_fragment(&self, id: &str) -> Result<Option<Fragment>> {
        let row = sqlx::query(
            r#"
            SELECT id, file, origin, section, content, start_line, end_line, linked_ids
            FROM fragments WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_fragment(&row)?)),
            None => Ok(None),
        }
    }

    async fn all_fragments(&self) -> Result<Vec<Fragment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, file, origin, section, content, start_line, end_line, linked_ids
            FROM fragments
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_fragment).collect()
    }

    async fn fragment_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fragments")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn vector_search(&self, query_vec: &[f32], limit: i64) -> Result<Vec<ScoredFragment>> {
        let rows = sqlx::query(
            r#"
            SELECT f.id, f.file, f.origin, f.section, f.content,
                   f.start_line, f.end_line, f.linked_ids, v.embedding
            FROM fragment_vectors v
            JOIN fragments f ON f.id = v.fragment_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut scored: Vec<ScoredFragment> = Vec::with_capacity(rows.len());
        for row in &rows {
            let fragment = row_to_fragment(row)?;
            let blob: Vec<u8> = row.get("embedding");
            let vector = blob_to_vec(&blob);
            scored.push(ScoredFragment {
                fragment,
                score: cosine_similarity(query_vec, &vector),
            });
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit as usize);
        Ok(scored)
    }
}
