//! CSV output: the sample upload file and the ledger export.

use std::io::Write;

use anyhow::{Context, Result};
use tally_core::LedgerEntry;

use crate::types::{AMOUNT_COLUMN, DATE_COLUMN, KIND_COLUMN};

const BOM: &str = "\u{feff}";

const EXAMPLE_ROWS: [(&str, &str, &str); 7] = [
    ("2024-01-15", "Deposit", "50.00"),
    ("2024-01-20", "Withdrawal", "75.50"),
    ("2024-02-05", "Deposit", "100.00"),
    ("2024-02-12", "Withdrawal", "150.00"),
    ("2024-03-01", "Deposit", "80.00"),
    ("2024-03-10", "Withdrawal", "120.75"),
    ("2024-03-25", "Deposit", "60.00"),
];

/// A small upload file in the accepted format, without BOM or trailing newline.
pub fn example_csv() -> String {
    let header = [DATE_COLUMN, KIND_COLUMN, AMOUNT_COLUMN].join(";");
    std::iter::once(header)
        .chain(EXAMPLE_ROWS.iter().map(|(d, k, a)| format!("{d};{k};{a}")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write ledger entries as `Date;Type;Value;Cumulative Balance`, BOM first so
/// spreadsheet tools pick up UTF-8.
pub fn write_ledger_csv<W: Write>(entries: &[LedgerEntry], mut out: W) -> Result<()> {
    out.write_all(BOM.as_bytes()).context("writing BOM")?;

    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(out);
    wtr.write_record(["Date", "Type", "Value", "Cumulative Balance"])?;
    for e in entries {
        wtr.write_record([
            e.date.clone(),
            e.kind.to_string(),
            format!("{:.2}", e.amount),
            format!("{:.2}", e.running_balance),
        ])?;
    }
    wtr.flush().context("flushing ledger CSV")?;
    Ok(())
}
