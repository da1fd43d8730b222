//! Fetch-and-export pipeline
//!
//! Query builder → API client → CSV exporter, all under one [`Deadline`]
//! started at entry. Any failure ends the invocation; there is no partial
//! success mode.

use std::time::Instant;

use tracing::{debug, info};

use crate::client::ApiClient;
use crate::config::RunSettings;
use crate::deadline::Deadline;
use crate::error::{AppError, Result};
use crate::export::{Destination, export};
use crate::query::build_query;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of records written to the report
    pub exported: usize,
    /// Where the report was written
    pub destination: Destination,
    /// Wall-clock time for the whole run
    pub elapsed_ms: u64,
}

/// Run one fetch and export
///
/// # Arguments
/// * `settings` - Resolved configuration
///
/// # Returns
/// * `Result<ExportSummary>` - Export statistics or the first error encountered
pub async fn run(settings: &RunSettings) -> Result<ExportSummary> {
    let start_time = Instant::now();
    let deadline = Deadline::start(settings.timeout);

    let envelope = build_query(&settings.params);
    let client = ApiClient::new(&settings.auth_header)?;

    info!("Fetching up to {} segment members", settings.params.limit());
    let response = client
        .execute(&settings.endpoint, settings.credential(), &envelope, &deadline)
        .await?;

    let records = response.records;
    let destination = settings.destination.clone();
    let cancel = deadline.token();

    debug!("Handing {} records to the exporter", records.len());
    let exported = tokio::task::spawn_blocking(move || export(&records, &destination, &cancel))
        .await
        .map_err(|e| AppError::Generic(format!("export task failed: {e}")))??;

    let elapsed_ms = start_time.elapsed().as_millis() as u64;
    info!(
        "Exported {} records to {} in {} ms",
        exported, settings.destination, elapsed_ms
    );

    Ok(ExportSummary {
        exported,
        destination: settings.destination.clone(),
        elapsed_ms,
    })
}
