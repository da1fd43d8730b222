//! CSV export of customer segment members
//!
//! The exporter writes a fixed header row and one row per record, in input
//! order, to a file or to standard output. Before each row it polls the
//! invocation's cancellation token; once cancelled it stops without writing a
//! partial row. Rows already written are kept, there is no rollback.
//!
//! Cancellation is only observed between rows: a write call that stalls is
//! not interrupted.

pub mod csv;

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::model::CustomerRecord;

pub use self::csv::{HEADER, format_amount, write_records};

/// Where the CSV report goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// The process's standard output
    Stdout,
    /// A file, created or truncated
    File(PathBuf),
}

impl Destination {
    /// Parse a destination string; empty or `-` selects standard output
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "-" => Destination::Stdout,
            path => Destination::File(PathBuf::from(path)),
        }
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, Destination::Stdout)
    }

    /// Open the destination for writing
    fn open(&self) -> std::result::Result<Box<dyn Write>, ExportError> {
        match self {
            Destination::Stdout => Ok(Box::new(io::stdout())),
            Destination::File(path) => {
                validate_path(path)?;
                let file = File::create(path).map_err(|e| {
                    ExportError::Write(format!("failed to create {}: {e}", path.display()))
                })?;
                Ok(Box::new(file))
            }
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => f.write_str("stdout"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Check that the parent directory of `path` exists
fn validate_path(path: &Path) -> std::result::Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(ExportError::Write(format!(
                "directory does not exist: {}",
                parent.display()
            )));
        }
    }
    Ok(())
}

/// Export records to `destination`
///
/// # Arguments
/// * `records` - Records in the order they should appear
/// * `destination` - File path or standard output
/// * `cancel` - Polled before each row
///
/// # Returns
/// * `Result<usize>` - Number of data rows written
pub fn export(
    records: &[CustomerRecord],
    destination: &Destination,
    cancel: &CancellationToken,
) -> Result<usize> {
    debug!("Exporting {} records to {}", records.len(), destination);

    let writer = destination.open()?;
    let written = write_records(writer, records, cancel)?;

    debug!("Finished CSV export to {} ({} rows)", destination, written);
    Ok(written)
}
