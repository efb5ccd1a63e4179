//! Reader for the semicolon-delimited transaction history export.
//!
//! Expected layout (header names verbatim):
//!   Date;Tipe;Vaule
//!   2024-01-15;Deposit;50,00

use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tally_core::RawRow;
use tracing::debug;

use crate::types::{AMOUNT_COLUMN, CsvRow, DATE_COLUMN, KIND_COLUMN};

const BOM: char = '\u{feff}';

/// Read every record under the `Date;Tipe;Vaule` header. Fields are trimmed,
/// short records are padded with empty fields, extra columns are ignored.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<CsvRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("reading CSV header")?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches(BOM).trim() == name)
    };

    let (date_idx, kind_idx, amount_idx) =
        match (column(DATE_COLUMN), column(KIND_COLUMN), column(AMOUNT_COLUMN)) {
            (Some(d), Some(k), Some(a)) => (d, k, a),
            (d, k, _) => {
                let missing = if d.is_none() {
                    DATE_COLUMN
                } else if k.is_none() {
                    KIND_COLUMN
                } else {
                    AMOUNT_COLUMN
                };
                bail!("missing column '{missing}' (expected header Date;Tipe;Vaule)");
            }
        };

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result.context("reading CSV record")?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

        out.push(CsvRow {
            line,
            row: RawRow::new(field(date_idx), field(kind_idx), field(amount_idx)),
        });
    }

    debug!(rows = out.len(), "read upload CSV");
    Ok(out)
}

/// Read an upload file from disk.
pub fn read_rows_from_path(path: impl AsRef<Path>) -> Result<Vec<CsvRow>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_rows(file).with_context(|| format!("parsing {}", path.display()))
}
