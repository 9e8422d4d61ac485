//! zhiyuan-import - Admission record CSV import tool
//!
//! Bulk-loads historical admission rows into the shared database,
//! validating each line and skipping records that are already present.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use sqlx::SqlitePool;
use tracing::{info, warn};
use zhiyuan_common::config;

mod importer;
mod reader;

/// Command-line arguments for zhiyuan-import
#[derive(Parser, Debug)]
#[command(name = "zhiyuan-import")]
#[command(about = "Import admission records from a CSV file")]
#[command(version)]
struct Args {
    /// CSV file with columns: province, exam_type, year, school, major,
    /// min_score, min_rank
    csv_file: PathBuf,

    /// Root folder containing the admissions database
    #[arg(short, long)]
    root_folder: Option<String>,
}

/// How many validation errors to print before summarizing the rest
const MAX_REPORTED_ERRORS: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Reading {}", args.csv_file.display());
    let (rows, errors) = reader::read_csv_file(&args.csv_file)?;

    if !errors.is_empty() {
        warn!("{} invalid rows:", errors.len());
        for error in errors.iter().take(MAX_REPORTED_ERRORS) {
            warn!("  {}", error);
        }
        if errors.len() > MAX_REPORTED_ERRORS {
            warn!("  ... and {} more", errors.len() - MAX_REPORTED_ERRORS);
        }
    }

    if rows.is_empty() {
        bail!("no valid rows to import");
    }
    info!("{} valid rows parsed", rows.len());

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), "ZHIYUAN_ROOT_FOLDER")
        .context("Failed to resolve root folder")?;
    let db_path = config::database_path(&root_folder);

    if !db_path.exists() {
        bail!(
            "Database not found: {}\nRun zhiyuan-web first to initialize the database.",
            db_path.display()
        );
    }

    let pool = SqlitePool::connect(&format!("sqlite://{}", db_path.display()))
        .await
        .context("Failed to connect to database")?;

    let stats = importer::import_rows(&pool, &rows).await?;

    info!("Import complete:");
    info!("  imported: {}", stats.imported);
    info!("  skipped (duplicates): {}", stats.skipped);
    info!("  failed: {}", stats.failed);
    info!("  total processed: {}", stats.total());

    if stats.imported == 0 {
        bail!("nothing was imported");
    }

    Ok(())
}
