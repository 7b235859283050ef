use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;

use seinfeld_quotes::db::setup_database;
use seinfeld_quotes::importer::{self, DEFAULT_BATCH_SIZE};
use seinfeld_quotes::store::QuoteStore;

///Loads quotes from a `quote,character,season,episode` CSV into the database
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    ///CSV file to load; the first row is treated as a header
    csv_path: PathBuf,

    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:quotes.db")]
    database_url: String,

    ///Rows inserted per transaction
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    ///Delete existing quotes before loading
    #[arg(long)]
    replace: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    seinfeld_quotes::init_tracing();
    let args = Args::parse();

    tracing::info!(path = %args.csv_path.display(), "starting csv import");
    let file = File::open(&args.csv_path)
        .inspect_err(|e| tracing::error!(err = ?e, path = %args.csv_path.display(), "failed to open csv file"))?;

    let pool = setup_database(&args.database_url, 1, Duration::from_secs(30)).await?;
    let store = QuoteStore::new(pool.clone());

    if args.replace {
        let removed = store.clear_quotes().await?;
        tracing::info!(removed, "cleared existing quotes");
    }

    let report = importer::import_csv(&store, file, args.batch_size).await?;
    for skipped in &report.skipped {
        tracing::warn!(line = skipped.line, reason = %skipped.reason, "row skipped");
    }
    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped.len(),
        "import finished"
    );

    let stats = store.stats().await?;
    tracing::info!(total = stats.total, "total records in table");
    for row in &stats.characters {
        tracing::info!(character = %row.name, quotes = row.quote_count, "quotes by character");
    }

    pool.close().await;
    Ok(())
}
