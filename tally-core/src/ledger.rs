//! Ledger builder: sanitize a whole batch, order it by date and annotate running balances.

use tracing::debug;

use crate::entry::{LedgerEntry, RawRow};
use crate::sanitize::sanitize_row;

/// Build the chronological ledger from a full batch of raw rows.
///
/// Rejected rows are dropped silently. Same-date rows keep their input order
/// (stable sort), so the running balance is deterministic for a fixed input.
/// An all-invalid batch yields an empty ledger.
pub fn build_ledger(rows: &[RawRow]) -> Vec<LedgerEntry> {
    let mut entries: Vec<LedgerEntry> = rows.iter().filter_map(sanitize_row).collect();
    let dropped = rows.len() - entries.len();

    entries.sort_by_key(|e| e.at);

    let ledger: Vec<LedgerEntry> = entries
        .into_iter()
        .scan(0.0_f64, |balance, mut entry| {
            *balance += entry.signed_delta;
            entry.running_balance = *balance;
            Some(entry)
        })
        .collect();

    debug!(input = rows.len(), kept = ledger.len(), dropped, "built ledger");
    ledger
}

/// First and last entry dates of a ledger, for pre-filling date bounds.
pub fn ledger_date_span(ledger: &[LedgerEntry]) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
    let first = ledger.first()?;
    let last = ledger.last()?;
    Some((first.at.date(), last.at.date()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Kind;

    fn row(date: &str, kind: &str, amount: &str) -> RawRow {
        RawRow::new(date, kind, amount)
    }

    #[test]
    fn test_empty_input() {
        assert!(build_ledger(&[]).is_empty());
    }

    #[test]
    fn test_sorts_by_date() {
        let ledger = build_ledger(&[
            row("2024-02-15", "Deposit", "50€"),
            row("2024-01-10", "Withdrawal", "100€"),
        ]);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].date, "2024-01-10");
        assert_eq!(ledger[1].date, "2024-02-15");
    }

    #[test]
    fn test_running_balance_sequence() {
        let ledger = build_ledger(&[
            row("2024-01-01", "Deposit", "100"),
            row("2024-01-02", "Withdrawal", "150"),
            row("2024-01-03", "Deposit", "50"),
        ]);
        let balances: Vec<f64> = ledger.iter().map(|e| e.running_balance).collect();
        assert_eq!(balances, vec![-100.0, 50.0, 0.0]);
    }

    #[test]
    fn test_same_day_keeps_input_order() {
        let ledger = build_ledger(&[
            row("2024-01-02", "Withdrawal", "30"),
            row("2024-01-01", "Deposit", "10"),
            row("2024-01-02", "Deposit", "20"),
        ]);
        assert_eq!(ledger[0].kind, Kind::Deposit);
        assert_eq!(ledger[1].kind, Kind::Withdrawal);
        assert_eq!(ledger[1].amount, 30.0);
        assert_eq!(ledger[2].amount, 20.0);
        assert_eq!(ledger[1].running_balance, 20.0);
        assert_eq!(ledger[2].running_balance, 0.0);
    }

    #[test]
    fn test_time_of_day_orders_within_a_day() {
        let ledger = build_ledger(&[
            row("2024-01-01T18:00:00", "Withdrawal", "5"),
            row("2024-01-01T09:00:00", "Deposit", "5"),
        ]);
        assert_eq!(ledger[0].kind, Kind::Deposit);
    }

    #[test]
    fn test_invalid_rows_dropped() {
        let ledger = build_ledger(&[
            row("2024-01-01", "Deposit", "100"),
            row("invalid-date", "Deposit", "50"),
            row("2024-01-02", "Invalid", "50"),
            row("2024-01-03", "Deposit", ""),
        ]);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].date, "2024-01-01");
    }

    #[test]
    fn test_all_invalid_is_empty() {
        let ledger = build_ledger(&[
            row("yesterday", "Deposit", "1"),
            row("2024-01-01", "Bonus", "1"),
            row("2024-01-01", "Deposit", ""),
        ]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_date_span() {
        let ledger = build_ledger(&[
            row("2024-03-01", "Deposit", "1"),
            row("2023-12-24", "Deposit", "1"),
        ]);
        let (first, last) = ledger_date_span(&ledger).unwrap();
        assert_eq!(first.to_string(), "2023-12-24");
        assert_eq!(last.to_string(), "2024-03-01");
        assert!(ledger_date_span(&[]).is_none());
    }
}
