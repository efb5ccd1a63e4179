//! tally-ingest: upload CSV reader, pre-flight validation, merge and CSV export.

pub mod export;
pub mod merge;
pub mod parsers;
pub mod types;
pub mod validate;

pub use export::{example_csv, write_ledger_csv};
pub use merge::{Conflict, MergeOutcome, merge_rows};
pub use parsers::{read_rows, read_rows_from_path};
pub use types::CsvRow;
pub use validate::{FORMAT_HELP, RowError, Validation, validate_rows};
