//! Bulk-load the ingredient catalog from a JSON file.
//!
//! The file is an array of `{ "name": ..., "measurement_unit": ... }`
//! objects. Names already in the catalog are skipped, so re-running the
//! seed is safe.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use ladle_core::{ingredient::NewIngredient, store::RecipeStore};
use ladle_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Seed the Ladle ingredient catalog")]
struct Cli {
  /// JSON file with the ingredients to load.
  seed_file: PathBuf,

  /// Path to the SQLite store.
  #[arg(short, long, default_value = "ladle.db")]
  store: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let raw = std::fs::read_to_string(&cli.seed_file)
    .with_context(|| format!("failed to read {:?}", cli.seed_file))?;
  let entries: Vec<NewIngredient> =
    serde_json::from_str(&raw).context("failed to parse seed file")?;

  let store = SqliteStore::open(&cli.store)
    .await
    .with_context(|| format!("failed to open store at {:?}", cli.store))?;

  let total = entries.len();
  for entry in entries {
    store
      .add_ingredient(entry)
      .await
      .context("failed to insert ingredient")?;
  }

  tracing::info!("Seeded {total} ingredients into {:?}", cli.store);
  Ok(())
}
