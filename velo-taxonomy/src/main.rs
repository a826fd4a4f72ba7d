//! velo-taxonomy - Vehicle taxonomy seeder
//!
//! Reads a Make/Model/Variant CSV export, folds it into the three-level
//! hierarchy and reconciles it into the shared SQLite database with
//! idempotent upserts. Safe to re-run against the same input.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use velo_common::config::{resolve_database_path, DEFAULT_BATCH_SIZE};
use velo_taxonomy::parser::read_taxonomy_file;
use velo_taxonomy::reconcile::{seed_taxonomy, SeedOptions};
use velo_taxonomy::tree::TaxonomyTree;

/// Command-line arguments for velo-taxonomy
#[derive(Parser, Debug)]
#[command(name = "velo-taxonomy")]
#[command(about = "Seed the vehicle taxonomy from a CSV export")]
#[command(version)]
struct Args {
    /// Taxonomy CSV file (Make, Model, Model_Variant, Year_Start, Year_End)
    csv: PathBuf,

    /// SQLite database file
    #[arg(short, long, env = "VELO_DATABASE")]
    database: Option<PathBuf>,

    /// Maximum concurrent upserts per dispatched chunk
    #[arg(long, env = "VELO_SEED_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Delete the existing taxonomy (restarting ids) before seeding
    #[arg(long)]
    fresh: bool,

    /// Overwrite year ranges on variants that already exist
    #[arg(long)]
    refresh_years: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting Velo taxonomy seeder v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let db_path = resolve_database_path(args.database);
    info!("Database path: {}", db_path.display());

    let pool = velo_common::db::init_database_pool(&db_path)
        .await
        .context("Failed to open taxonomy database")?;

    if args.fresh {
        velo_taxonomy::db::reset_taxonomy(&pool)
            .await
            .context("Failed to clear existing taxonomy")?;
        info!("✓ Cleared existing taxonomy");
    }

    // The whole stream is parsed and validated before the first write,
    // so malformed input never leaves a partially seeded store
    let records = read_taxonomy_file(&args.csv)
        .with_context(|| format!("Failed to read {}", args.csv.display()))?;
    info!("Parsed {} taxonomy rows from {}", records.len(), args.csv.display());

    let tree = TaxonomyTree::from_records(records);

    let options = SeedOptions {
        batch_size: args.batch_size,
        refresh_years: args.refresh_years,
    };
    let report = seed_taxonomy(&pool, &tree, &options).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
