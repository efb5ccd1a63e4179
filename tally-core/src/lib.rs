//! tally-core: transaction model, row sanitizer, ledger builder and range filter

pub mod entry;
pub mod filter;
pub mod ledger;
pub mod sanitize;

pub use entry::{Kind, LedgerEntry, RawRow};
pub use filter::{DateRange, FilterError, KindFilter, filter_ledger};
pub use ledger::{build_ledger, ledger_date_span};
pub use sanitize::{RowIssue, parse_date, row_issues, sanitize_amount, sanitize_row};
