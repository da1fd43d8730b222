//! segment-export
//!
//! Fetches customer segment members from a commerce GraphQL Admin API and
//! exports them to CSV.
//!
//! # Usage
//!
//! ```bash
//! SEGMENT_EXPORT_DOMAIN=my-shop.example.com \
//! SEGMENT_EXPORT_ACCESS_TOKEN=... \
//! segment-export -q "customer_tags CONTAINS 'vip'" -f 100 -o vip.csv
//! ```

use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use segment_export::cli::CliInterface;
use segment_export::error::Result;
use segment_export::{ExportSummary, RunSettings, pipeline};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or run the export
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    let settings = RunSettings::resolve(cli.config())?;
    debug!("Resolved settings: {:?}", settings);

    let summary = pipeline::run(&settings).await?;
    report_success(&summary);
    Ok(())
}

/// Print the success confirmation
///
/// Goes to stderr when the CSV itself is on stdout.
fn report_success(summary: &ExportSummary) {
    let message = format!(
        "Successfully exported {} customers to {}",
        summary.exported, summary.destination
    );
    if summary.destination.is_stdout() {
        eprintln!("{}", message);
    } else {
        println!("{}", message);
    }
}

/// Initialize logging system based on configured level
///
/// `RUST_LOG` takes precedence when set. Logs go to stderr so that CSV
/// written to stdout stays clean.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
