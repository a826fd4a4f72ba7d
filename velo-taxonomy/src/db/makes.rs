//! Make persistence and identifier resolution

use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use velo_common::Result;

/// Persisted make row
#[derive(Debug, Clone)]
pub struct Make {
    pub id: i64,
    pub name: String,
    pub image: String,
}

/// Deterministic logo asset URL for a make name.
///
/// Lower-cases the name and collapses whitespace runs to hyphens:
/// "ALFA ROMEO" becomes ".../alfa-romeo-logo.png".
pub fn logo_url(name: &str) -> String {
    let slug = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    format!("https://vl.imgix.net/img/{slug}-logo.png?auto-format,compress")
}

/// Create the make on first sight, or refresh its derived image on a
/// name match.
pub async fn upsert_make(pool: &SqlitePool, name: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO makes (name, image, created_at, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(name) DO UPDATE SET
            image = excluded.image,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(name)
    .bind(logo_url(name))
    .execute(pool)
    .await?;

    Ok(())
}

/// Full scan of the committed make set
pub async fn load_all_makes(pool: &SqlitePool) -> Result<Vec<Make>> {
    let rows = sqlx::query("SELECT id, name, image FROM makes ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| Make {
            id: row.get("id"),
            name: row.get("name"),
            image: row.get("image"),
        })
        .collect())
}

/// Read back the committed make set as a name -> surrogate id map
pub async fn load_make_ids(pool: &SqlitePool) -> Result<HashMap<String, i64>> {
    Ok(load_all_makes(pool)
        .await?
        .into_iter()
        .map(|make| (make.name, make.id))
        .collect())
}

pub async fn count_makes(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM makes")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
