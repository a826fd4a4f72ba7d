//! Variant persistence, keyed on the owning model

use sqlx::SqlitePool;
use velo_common::Result;

/// Pending variant upsert, built once the owning model's id is resolved
#[derive(Debug, Clone)]
pub struct PendingVariant {
    pub model_id: i64,
    pub name: String,
    pub year_start: i32,
    pub year_end: i32,
}

/// Create the variant under its model, or refresh it on a
/// (model_id, name) match.
///
/// The year range is written on the create path only; a matched variant
/// keeps its stored range unless `refresh_years` is set, in which case
/// the range is overwritten from the input as well.
pub async fn upsert_variant(
    pool: &SqlitePool,
    variant: PendingVariant,
    refresh_years: bool,
) -> Result<()> {
    let sql = if refresh_years {
        r#"
        INSERT INTO model_variants (model_id, name, year_start, year_end, created_at, updated_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(model_id, name) DO UPDATE SET
            name = excluded.name,
            year_start = excluded.year_start,
            year_end = excluded.year_end,
            updated_at = CURRENT_TIMESTAMP
        "#
    } else {
        r#"
        INSERT INTO model_variants (model_id, name, year_start, year_end, created_at, updated_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(model_id, name) DO UPDATE SET
            name = excluded.name,
            updated_at = CURRENT_TIMESTAMP
        "#
    };

    sqlx::query(sql)
        .bind(variant.model_id)
        .bind(&variant.name)
        .bind(variant.year_start)
        .bind(variant.year_end)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn count_variants(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM model_variants")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
