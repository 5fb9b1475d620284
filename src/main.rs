use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_seeder::config::Config;
use catalog_seeder::error::AppError;
use catalog_seeder::fixture::load_fixture;
use catalog_seeder::report::write_report;
use catalog_seeder::services::{BulkLoader, LoadReport, plan};
use catalog_seeder::store::SqliteDocumentStore;

fn is_dry_run() -> bool {
    std::env::args().any(|a| a == "--dry-run")
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "catalog_seeder=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(is_dry_run()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Reported once, outside the log filter.
            eprintln!("Import failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(dry_run: bool) -> Result<(), AppError> {
    let config = Config::new_from_env()?;
    let groups = load_fixture(&config.catalog_path)?;

    let report: LoadReport = if dry_run {
        info!("Dry run, nothing will be written");
        plan(&config.collection, &groups)?
    } else {
        let store = SqliteDocumentStore::connect(&config.database_url)
            .await?
            .with_batch_limit(config.batch_limit);
        store.migrate().await?;

        BulkLoader::new(Arc::new(store), config.collection.clone())?
            .with_commit_timeout(config.commit_timeout)
            .load(&groups)
            .await?
    };

    write_report(&report, std::io::stdout().lock())?;
    Ok(())
}
