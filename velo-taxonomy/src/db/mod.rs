//! Store access for the persisted taxonomy hierarchy.
//!
//! One module per entity, each exposing the idempotent upsert used by
//! reconciliation and the reads that build identifier resolution maps.

pub mod makes;
pub mod models;
pub mod variants;

use sqlx::SqlitePool;
use velo_common::Result;

/// Delete every taxonomy row and restart the surrogate id sequences,
/// so the next seed run starts from id 1.
///
/// Variants and models go first; makes last. Explicit deletes rather
/// than relying on cascade keeps the statement order obvious.
pub async fn reset_taxonomy(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM model_variants").execute(pool).await?;
    sqlx::query("DELETE FROM models").execute(pool).await?;
    sqlx::query("DELETE FROM makes").execute(pool).await?;

    // sqlite_sequence only exists once an AUTOINCREMENT insert happened
    let has_sequence: Option<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
    )
    .fetch_optional(pool)
    .await?;
    if has_sequence.is_some() {
        sqlx::query(
            "DELETE FROM sqlite_sequence WHERE name IN ('makes', 'models', 'model_variants')",
        )
        .execute(pool)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use velo_common::db::init_memory_pool;

    #[tokio::test]
    async fn reset_clears_rows_and_restarts_ids() {
        let pool = init_memory_pool().await.unwrap();

        makes::upsert_make(&pool, "ABARTH").await.unwrap();
        makes::upsert_make(&pool, "TOYOTA").await.unwrap();

        reset_taxonomy(&pool).await.unwrap();

        assert_eq!(makes::count_makes(&pool).await.unwrap(), 0);

        makes::upsert_make(&pool, "VOLVO").await.unwrap();
        let ids = makes::load_make_ids(&pool).await.unwrap();
        assert_eq!(ids.get("VOLVO"), Some(&1));
    }

    #[tokio::test]
    async fn reset_on_empty_database_is_a_no_op() {
        let pool = init_memory_pool().await.unwrap();
        reset_taxonomy(&pool).await.unwrap();
        assert_eq!(makes::count_makes(&pool).await.unwrap(), 0);
    }
}
