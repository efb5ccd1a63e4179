//! Pre-flight checks for an upload before anything is stored.
//!
//! Uses `tally_core::row_issues`, so a row that passes here is exactly a row the
//! ledger builder keeps.

use std::fmt;

use serde::Serialize;
use tally_core::{RawRow, RowIssue, row_issues};
use tracing::{debug, warn};

use crate::types::CsvRow;

/// How many row errors the digest spells out before summarising the rest.
const SUMMARY_SAMPLE: usize = 3;

pub const FORMAT_HELP: &str = "Expected: ';'-separated CSV with header Date;Tipe;Vaule, \
    dates as YYYY-MM-DD, numeric values (10.50 or 10,50) and Tipe either Deposit or Withdrawal.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub line: u64,
    pub issues: Vec<RowIssue>,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: ", self.line)?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// Rows that are not blank padding, in file order (valid or not)
    pub rows: Vec<RawRow>,
    pub errors: Vec<RowError>,
    /// Fully blank rows skipped
    pub blank: usize,
}

impl Validation {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of rows that will survive into the ledger
    pub fn valid_count(&self) -> usize {
        self.rows.len() - self.errors.len()
    }

    /// Short digest: the first few row errors, then a count of the rest.
    pub fn summary(&self) -> String {
        let sample: Vec<String> = self
            .errors
            .iter()
            .take(SUMMARY_SAMPLE)
            .map(ToString::to_string)
            .collect();
        let mut out = sample.join(" • ");
        if self.errors.len() > SUMMARY_SAMPLE {
            out.push_str(&format!(
                " ...and {} more lines with problems.",
                self.errors.len() - SUMMARY_SAMPLE
            ));
        }
        out
    }
}

pub fn validate_rows(rows: &[CsvRow]) -> Validation {
    let mut out = Validation::default();

    for csv_row in rows {
        if csv_row.row.is_blank() {
            out.blank += 1;
            continue;
        }
        let issues = row_issues(&csv_row.row);
        if !issues.is_empty() {
            debug!(line = csv_row.line, ?issues, "row rejected");
            out.errors.push(RowError {
                line: csv_row.line,
                issues,
            });
        }
        out.rows.push(csv_row.row.clone());
    }

    if out.blank > 0 {
        warn!(blank = out.blank, "skipped blank rows");
    }
    if !out.errors.is_empty() {
        warn!(invalid = out.errors.len(), "upload has invalid rows");
    }
    out
}
