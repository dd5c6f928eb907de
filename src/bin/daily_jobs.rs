//! Runs one tick of the daily maintenance jobs over the application
//! database: advances due recurring transactions and refreshes the currency
//! table. An external timer (e.g. cron) is expected to run this once a day.

use clap::Parser;
use rusqlite::Connection;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing_subscriber::EnvFilter;

use fiscus::{
    currency::{ExchangeRateClient, refresh_currencies},
    recurrence::RecurrenceEngine,
    stores::create_stores,
};

/// The daily maintenance jobs for the fiscus database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// Skip fetching fresh exchange rates, e.g. when running offline.
    #[arg(long)]
    skip_rates: bool,
}

fn main() {
    setup_logging();

    let args = Args::parse();

    let connection = Connection::open(&args.db_path).expect("could not open the database");
    let stores = create_stores(connection).expect("could not initialize the database");

    let now_utc = OffsetDateTime::now_utc();
    let now = PrimitiveDateTime::new(now_utc.date(), now_utc.time());

    tracing::info!("advancing recurring transactions due before {now}");
    let mut engine = RecurrenceEngine::new(stores.ledger);
    engine.advance_due(now);

    let mut refreshed_currencies = 0;
    if !args.skip_rates {
        let mut currencies = stores.currencies;

        match refresh_currencies(&ExchangeRateClient::new(), &mut currencies) {
            Ok(written) => {
                tracing::info!("refreshed {written} currencies");
                refreshed_currencies = written;
            }
            Err(error) => tracing::error!("could not refresh the currency table: {error}"),
        }
    }

    println!(
        "{}",
        serde_json::json!({
            "ran_at": now.to_string(),
            "refreshed_currencies": refreshed_currencies,
        })
    );
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
