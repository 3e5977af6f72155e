//! Import reference data (ingredients, tags) from JSON files.
//!
//! ```bash
//! load-data ingredients data/ingredients.json
//! load-data tags data/tags.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sea_orm::Database;
use serde::de::DeserializeOwned;
use tracing::info;

use foodgram_api::infra::import::{import_ingredients, import_tags};
use foodgram_core::tracing::init_tracing;

#[derive(Parser)]
#[command(about = "Load Foodgram reference data into the database")]
struct Args {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import `[{"name", "measurement_unit"}]`
    Ingredients { file: PathBuf },
    /// Import `[{"name", "color", "slug"}]`
    Tags { file: PathBuf },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let db = Database::connect(&args.database_url)
        .await
        .context("failed to connect to database")?;

    match args.command {
        Command::Ingredients { file } => {
            let report = import_ingredients(&db, read_json(&file)?).await?;
            info!(
                inserted = report.inserted,
                skipped = report.skipped,
                "ingredients imported"
            );
        }
        Command::Tags { file } => {
            let report = import_tags(&db, read_json(&file)?).await?;
            info!(
                inserted = report.inserted,
                skipped = report.skipped,
                "tags imported"
            );
        }
    }
    Ok(())
}
