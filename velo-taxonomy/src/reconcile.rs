//! Three-phase reconciliation of the aggregated tree into the store.
//!
//! Phases run strictly in order: makes, then models, then variants.
//! Each phase fully commits and is read back before the next phase
//! starts, because children are keyed on the surrogate ids the store
//! assigned to their parents. The bulk write path only addresses rows
//! by natural key, so the read-back is what establishes the natural
//! key -> surrogate id maps.
//!
//! There is no rollback: a failure aborts the current and all remaining
//! phases, and whatever already committed stays committed. Re-running
//! the pipeline converges because every write is an upsert.

use crate::batch::run_in_batches;
use crate::db::{makes, models, variants};
use crate::tree::TaxonomyTree;
use futures::future::join_all;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;
use velo_common::{config::DEFAULT_BATCH_SIZE, Error, Result};

/// Tuning knobs for one seed run
#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Maximum number of concurrent upserts per dispatched chunk
    pub batch_size: usize,
    /// Also overwrite year ranges on variants that already exist.
    /// Off by default: a matched variant keeps its stored range.
    pub refresh_years: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            refresh_years: false,
        }
    }
}

/// Per-phase write counts for one completed run
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub run_id: Uuid,
    pub makes: usize,
    pub models: usize,
    pub variants: usize,
    pub variants_skipped: usize,
}

/// Reconcile the tree into the store and report per-phase counts.
pub async fn seed_taxonomy(
    pool: &SqlitePool,
    tree: &TaxonomyTree,
    options: &SeedOptions,
) -> Result<SeedReport> {
    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        makes = tree.make_count(),
        models = tree.model_count(),
        variants = tree.variant_count(),
        "Starting taxonomy reconciliation"
    );

    let makes_written = seed_makes(pool, tree).await?;
    let make_ids = makes::load_make_ids(pool).await?;
    info!("✓ Seeded {} makes", makes_written);

    let models_written = seed_models(pool, tree, &make_ids, options.batch_size).await?;
    let model_ids = models::load_model_ids(pool).await?;
    info!("✓ Seeded {} models", models_written);

    let (variants_written, variants_skipped) =
        seed_variants(pool, tree, &model_ids, options).await?;
    info!(
        "✓ Seeded {} variants ({} skipped)",
        variants_written, variants_skipped
    );

    Ok(SeedReport {
        run_id,
        makes: makes_written,
        models: models_written,
        variants: variants_written,
        variants_skipped,
    })
}

/// Phase 1: upsert every make, dispatched together as one group.
///
/// The make set is small enough that it is not chunked; the models and
/// variants that follow go through the batch scheduler.
pub async fn seed_makes(pool: &SqlitePool, tree: &TaxonomyTree) -> Result<usize> {
    let results = join_all(
        tree.make_names()
            .map(|name| makes::upsert_make(pool, name)),
    )
    .await;

    let written = results.len();
    results.into_iter().collect::<Result<Vec<()>>>()?;
    Ok(written)
}

/// Phase 2: upsert every (make, model) pair through the batch
/// scheduler, keyed on the make ids read back after phase 1.
pub async fn seed_models(
    pool: &SqlitePool,
    tree: &TaxonomyTree,
    make_ids: &HashMap<String, i64>,
    batch_size: usize,
) -> Result<usize> {
    let mut pending = Vec::new();
    for (make, model) in tree.models() {
        // Phase 1 committed every tree make, so a miss here is a bug
        let make_id = *make_ids.get(make).ok_or_else(|| {
            Error::Internal(format!("make '{make}' missing from committed set"))
        })?;
        pending.push(models::PendingModel {
            make_id,
            name: model.to_string(),
        });
    }

    run_in_batches(pending, batch_size, |model| models::upsert_model(pool, model)).await
}

/// Phase 3: resolve each variant's owning model and upsert through the
/// batch scheduler.
///
/// A (make, model) key with no committed model id marks an orphaned
/// tree entry; the variant is skipped rather than failing the run, and
/// the skip is counted. Returns (written, skipped).
pub async fn seed_variants(
    pool: &SqlitePool,
    tree: &TaxonomyTree,
    model_ids: &HashMap<String, i64>,
    options: &SeedOptions,
) -> Result<(usize, usize)> {
    let mut pending = Vec::new();
    let mut skipped = 0usize;

    for (make, model, variant, range) in tree.variants() {
        match model_ids.get(&format!("{make}-{model}")) {
            Some(&model_id) => pending.push(variants::PendingVariant {
                model_id,
                name: variant.to_string(),
                year_start: range.start,
                year_end: range.end,
            }),
            None => {
                warn!(make, model, variant, "Skipping variant with no committed model");
                skipped += 1;
            }
        }
    }

    let refresh_years = options.refresh_years;
    let written = run_in_batches(pending, options.batch_size, |variant| {
        variants::upsert_variant(pool, variant, refresh_years)
    })
    .await?;

    Ok((written, skipped))
}
