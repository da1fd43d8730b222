//! CSV row formatting and writing
//!
//! Amounts are rounded to two decimals with round-half-away-from-zero, so
//! `12.345` becomes `12.35` and `100` becomes `100.00`.

use std::io::{BufWriter, Write};

use rust_decimal::{Decimal, RoundingStrategy};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::error::ExportError;
use crate::model::CustomerRecord;

/// Column headers, in output order
pub const HEADER: [&str; 5] = [
    "ID",
    "Display Name",
    "Email Address",
    "Amount Spent",
    "Currency Code",
];

/// Format a monetary amount with exactly two decimal digits
///
/// Values with more than 26 integer digits cannot be rescaled, so the
/// missing zeros are padded onto the string.
pub fn format_amount(amount: &Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    let text = rounded.to_string();
    match rounded.scale() {
        0 => format!("{text}.00"),
        1 => format!("{text}0"),
        _ => text,
    }
}

/// Write the header and one row per record to `writer`
///
/// The cancellation token is checked before every data row. The writer is
/// flushed on success and dropped (flushing what was written) on every
/// error path.
///
/// # Returns
/// * `Result<usize, ExportError>` - Number of data rows written
pub fn write_records<W: Write>(
    writer: W,
    records: &[CustomerRecord],
    cancel: &CancellationToken,
) -> Result<usize, ExportError> {
    let mut wtr = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(BufWriter::new(writer));

    wtr.write_record(HEADER)?;

    let mut written = 0usize;
    for record in records {
        if cancel.is_cancelled() {
            warn!("Export cancelled after {} of {} rows", written, records.len());
            return Err(ExportError::Cancelled {
                rows_written: written,
            });
        }

        let amount = format_amount(&record.amount);
        wtr.write_record([
            record.id.as_str(),
            record.display_name.as_str(),
            record.email.as_deref().unwrap_or(""),
            amount.as_str(),
            record.currency_code.as_str(),
        ])?;
        written += 1;
        trace!("Wrote row for {}", record.id);
    }

    wtr.flush()?;
    Ok(written)
}
