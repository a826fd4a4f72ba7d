//! Model persistence, keyed on the owning make

use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use velo_common::Result;

/// Pending model upsert, built once the owning make's id is known
#[derive(Debug, Clone)]
pub struct PendingModel {
    pub make_id: i64,
    pub name: String,
}

/// Persisted model row with the owning make's name projected in
#[derive(Debug, Clone)]
pub struct ModelRow {
    pub id: i64,
    pub name: String,
    pub make_name: String,
}

/// Create the model under its make, or refresh the name on a
/// (make_id, name) match.
pub async fn upsert_model(pool: &SqlitePool, model: PendingModel) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO models (make_id, name, created_at, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(make_id, name) DO UPDATE SET
            name = excluded.name,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(model.make_id)
    .bind(&model.name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Full scan of committed models joined to their owning make
pub async fn load_models_with_make(pool: &SqlitePool) -> Result<Vec<ModelRow>> {
    let rows = sqlx::query(
        r#"
        SELECT models.id, models.name, makes.name AS make_name
        FROM models
        JOIN makes ON makes.id = models.make_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ModelRow {
            id: row.get("id"),
            name: row.get("name"),
            make_name: row.get("make_name"),
        })
        .collect())
}

/// Resolution map from "{make name}-{model name}" to the model's
/// surrogate id, built by reading back the committed model set.
pub async fn load_model_ids(pool: &SqlitePool) -> Result<HashMap<String, i64>> {
    Ok(load_models_with_make(pool)
        .await?
        .into_iter()
        .map(|model| (format!("{}-{}", model.make_name, model.name), model.id))
        .collect())
}

pub async fn count_models(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM models")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::makes;
    use velo_common::db::init_memory_pool;

    async fn seed_make(pool: &SqlitePool, name: &str) -> i64 {
        makes::upsert_make(pool, name).await.unwrap();
        *makes::load_make_ids(pool).await.unwrap().get(name).unwrap()
    }

    #[tokio::test]
    async fn upsert_matches_by_make_and_name() {
        let pool = init_memory_pool().await.unwrap();
        let make_id = seed_make(&pool, "ABARTH").await;

        let model = PendingModel {
            make_id,
            name: "500".to_string(),
        };
        upsert_model(&pool, model.clone()).await.unwrap();
        upsert_model(&pool, model).await.unwrap();

        assert_eq!(count_models(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn same_model_name_under_different_makes_is_two_rows() {
        let pool = init_memory_pool().await.unwrap();
        let abarth = seed_make(&pool, "ABARTH").await;
        let fiat = seed_make(&pool, "FIAT").await;

        upsert_model(&pool, PendingModel { make_id: abarth, name: "500".to_string() })
            .await
            .unwrap();
        upsert_model(&pool, PendingModel { make_id: fiat, name: "500".to_string() })
            .await
            .unwrap();

        assert_eq!(count_models(&pool).await.unwrap(), 2);

        let ids = load_model_ids(&pool).await.unwrap();
        assert!(ids.contains_key("ABARTH-500"));
        assert!(ids.contains_key("FIAT-500"));
        assert_ne!(ids["ABARTH-500"], ids["FIAT-500"]);
    }

    #[tokio::test]
    async fn resolution_map_projects_the_owning_make_name() {
        let pool = init_memory_pool().await.unwrap();
        let make_id = seed_make(&pool, "ALFA ROMEO").await;

        upsert_model(&pool, PendingModel { make_id, name: "Giulia".to_string() })
            .await
            .unwrap();

        let rows = load_models_with_make(&pool).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].make_name, "ALFA ROMEO");

        let ids = load_model_ids(&pool).await.unwrap();
        assert_eq!(ids.get("ALFA ROMEO-Giulia"), Some(&rows[0].id));
    }
}
