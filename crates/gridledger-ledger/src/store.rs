//! Transaction store file.
//!
//! Plain comma-separated text, one transaction per line, behind a single
//! header line:
//!
//! ```text
//! transaction_id,buyer_id,seller_id,energy,price,timestamp
//! 1,7,3,120,0.15,1700000000
//! ```
//!
//! Import replays every line through `Ledger::record`, so all aggregates are
//! rebuilt from the transactions alone. Energy and price are written in their
//! shortest exact decimal form and parse back to the same `f64`.

use crate::entity::Transaction;
use crate::processor::Ledger;
use crate::registry::Registry;
use crate::views::all_transactions;
use gridledger_common::{BuyerId, LedgerError, Result, SellerId, TransactionId};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// Header line written at the top of every store file.
pub const STORE_HEADER: &str = "transaction_id,buyer_id,seller_id,energy,price,timestamp";

const FIELD_COUNT: usize = 6;

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Parses one data line. `line_no` is 1-based and only used in errors.
pub fn parse_line(line: &str, line_no: usize) -> Result<Transaction> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(LedgerError::ParseError {
            line: line_no,
            reason: format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        });
    }

    let energy_kwh: f64 = field(&fields, 3, "energy", line_no)?;
    let price_per_kwh: f64 = field(&fields, 4, "price", line_no)?;
    if !energy_kwh.is_finite() || !price_per_kwh.is_finite() {
        return Err(LedgerError::ParseError {
            line: line_no,
            reason: "energy and price must be finite".to_string(),
        });
    }

    Ok(Transaction::new(
        TransactionId::new(field(&fields, 0, "transaction_id", line_no)?),
        BuyerId::new(field(&fields, 1, "buyer_id", line_no)?),
        SellerId::new(field(&fields, 2, "seller_id", line_no)?),
        energy_kwh,
        price_per_kwh,
        field(&fields, 5, "timestamp", line_no)?,
    ))
}

fn field<T>(fields: &[&str], index: usize, name: &str, line_no: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fields[index]
        .parse()
        .map_err(|e: T::Err| LedgerError::ParseError {
            line: line_no,
            reason: format!("{} {:?}: {}", name, fields[index], e),
        })
}

/// Replays every transaction in `reader` into `ledger`.
///
/// A first non-blank line that does not start with a digit is treated as the
/// header. Blank lines are ignored. Malformed lines and duplicate ids are logged and
/// skipped. Only read failures abort the import.
pub fn read_transactions<R: BufRead>(reader: R, ledger: &mut Ledger) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    let mut first = true;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }
        if std::mem::take(&mut first) && !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }

        match parse_line(trimmed, line_no).and_then(|tx| ledger.record(tx)) {
            Ok(_) => report.imported += 1,
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping store line");
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

/// Imports the store file at `path`. A missing file leaves the ledger empty.
pub fn import(path: &Path, ledger: &mut Ledger) -> Result<ImportReport> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "store file not found, starting empty");
            return Ok(ImportReport::default());
        }
        Err(e) => return Err(e.into()),
    };

    let report = read_transactions(BufReader::new(file), ledger)?;
    info!(
        path = %path.display(),
        imported = report.imported,
        skipped = report.skipped,
        "imported transactions"
    );
    Ok(report)
}

/// Writes the header and every transaction in ascending id order. Returns
/// the number of transactions written.
pub fn write_transactions<W: Write>(mut writer: W, registry: &Registry) -> Result<usize> {
    writeln!(writer, "{}", STORE_HEADER)?;

    let mut written = 0;
    for tx in all_transactions(registry) {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            tx.id(),
            tx.buyer_id(),
            tx.seller_id(),
            tx.energy_kwh(),
            tx.price_per_kwh(),
            tx.timestamp()
        )?;
        written += 1;
    }

    writer.flush()?;
    Ok(written)
}

/// Exports every transaction to the store file at `path`, replacing it.
pub fn export(path: &Path, registry: &Registry) -> Result<usize> {
    let writer = BufWriter::new(File::create(path)?);
    let written = write_transactions(writer, registry)?;
    info!(path = %path.display(), written, "exported transactions");
    Ok(written)
}
