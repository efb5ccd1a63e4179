use serde::{Deserialize, Serialize};
use tally_core::RawRow;

/// Column names of the upload format. The misspellings are part of the format.
pub const DATE_COLUMN: &str = "Date";
pub const KIND_COLUMN: &str = "Tipe";
pub const AMOUNT_COLUMN: &str = "Vaule";

/// A row read from an upload file, with the file line it started on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRow {
    /// 1-based line number in the source file
    pub line: u64,
    pub row: RawRow,
}
