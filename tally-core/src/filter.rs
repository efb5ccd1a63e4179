//! Range filter: narrow a ledger by kind and inclusive date bounds.
//!
//! Running balances are carried over untouched from the full ledger.

use chrono::{NaiveDate, NaiveDateTime};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::entry::{Kind, LedgerEntry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("invalid {bound} date '{value}' (expected YYYY-MM-DD)")]
    InvalidBound { bound: &'static str, value: String },

    #[error("unknown transaction type '{0}' (expected All, Deposit or Withdrawal)")]
    UnknownKind(String),
}

/// Which kinds survive the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Only(Kind),
}

impl KindFilter {
    pub fn matches(&self, kind: Kind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Only(k) => *k == kind,
        }
    }
}

impl FromStr for KindFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "All" {
            return Ok(KindFilter::All);
        }
        Kind::parse(s)
            .map(KindFilter::Only)
            .ok_or_else(|| FilterError::UnknownKind(s.to_string()))
    }
}

/// Inclusive instant bounds. `end` sits at 23:59:59.999 of its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    /// Parse `YYYY-MM-DD` bounds. `None` or an empty string means unbounded on that side.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, FilterError> {
        let start = match non_empty(start) {
            Some(s) => Some(
                parse_bound_day(s, "start")?
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| invalid("start", s))?,
            ),
            None => None,
        };
        let end = match non_empty(end) {
            Some(s) => Some(
                parse_bound_day(s, "end")?
                    .and_hms_milli_opt(23, 59, 59, 999)
                    .ok_or_else(|| invalid("end", s))?,
            ),
            None => None,
        };
        Ok(Self { start, end })
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start.is_none_or(|s| at >= s) && self.end.is_none_or(|e| at <= e)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn parse_bound_day(s: &str, bound: &'static str) -> Result<NaiveDate, FilterError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid(bound, s))
}

fn invalid(bound: &'static str, value: &str) -> FilterError {
    FilterError::InvalidBound {
        bound,
        value: value.to_string(),
    }
}

/// Filter a ledger by kind and date window.
///
/// Fail-closed: if either bound does not parse, the whole result is empty.
pub fn filter_ledger(
    ledger: &[LedgerEntry],
    kind: KindFilter,
    start: Option<&str>,
    end: Option<&str>,
) -> Vec<LedgerEntry> {
    let range = match DateRange::parse(start, end) {
        Ok(r) => r,
        Err(e) => {
            debug!(error = %e, "filter bound rejected, returning empty view");
            return Vec::new();
        }
    };

    let out: Vec<LedgerEntry> = ledger
        .iter()
        .filter(|e| kind.matches(e.kind) && range.contains(e.at))
        .cloned()
        .collect();

    debug!(input = ledger.len(), kept = out.len(), "filtered ledger");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::RawRow;
    use crate::ledger::build_ledger;

    fn sample() -> Vec<LedgerEntry> {
        build_ledger(&[
            RawRow::new("2024-01-15", "Deposit", "100"),
            RawRow::new("2024-02-15", "Withdrawal", "100"),
            RawRow::new("2024-03-15", "Deposit", "100"),
            RawRow::new("2024-04-15", "Withdrawal", "100"),
        ])
    }

    #[test]
    fn test_all_without_bounds() {
        assert_eq!(filter_ledger(&sample(), KindFilter::All, None, None).len(), 4);
        assert_eq!(filter_ledger(&sample(), KindFilter::All, Some(""), Some("")).len(), 4);
    }

    #[test]
    fn test_by_kind() {
        let deposits = filter_ledger(&sample(), KindFilter::Only(Kind::Deposit), None, None);
        let withdrawals = filter_ledger(&sample(), KindFilter::Only(Kind::Withdrawal), None, None);
        assert_eq!(deposits.len(), 2);
        assert_eq!(withdrawals.len(), 2);
    }

    #[test]
    fn test_by_date_range() {
        let out = filter_ledger(&sample(), KindFilter::All, Some("2024-02-01"), Some("2024-03-31"));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].date, "2024-02-15");
        assert_eq!(out[1].date, "2024-03-15");
    }

    #[test]
    fn test_kind_and_range_combined() {
        let out = filter_ledger(
            &sample(),
            KindFilter::Only(Kind::Deposit),
            Some("2024-02-01"),
            Some("2024-12-31"),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, "2024-03-15");
    }

    #[test]
    fn test_end_bound_covers_whole_day() {
        let ledger = build_ledger(&[RawRow::new("2024-05-10T23:59:59", "Deposit", "1")]);
        let out = filter_ledger(&ledger, KindFilter::All, Some("2024-05-10"), Some("2024-05-10"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_fail_closed_on_bad_bound() {
        assert!(filter_ledger(&sample(), KindFilter::All, Some("not-a-date"), Some("")).is_empty());
        assert!(filter_ledger(&sample(), KindFilter::All, None, Some("2024-02-30")).is_empty());
        assert!(filter_ledger(&sample(), KindFilter::All, Some("invalid"), Some("also-invalid")).is_empty());
    }

    #[test]
    fn test_running_balance_not_recomputed() {
        let full = sample();
        let out = filter_ledger(&full, KindFilter::Only(Kind::Withdrawal), None, None);
        assert_eq!(out[0].running_balance, full[1].running_balance);
        assert_eq!(out[1].running_balance, full[3].running_balance);
    }

    #[test]
    fn test_kind_filter_from_str() {
        assert_eq!("All".parse::<KindFilter>().unwrap(), KindFilter::All);
        assert_eq!(
            "Withdrawal".parse::<KindFilter>().unwrap(),
            KindFilter::Only(Kind::Withdrawal)
        );
        assert!("all".parse::<KindFilter>().is_err());
    }

    #[test]
    fn test_range_error_message() {
        let err = DateRange::parse(Some("15/01/2024"), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid start date '15/01/2024' (expected YYYY-MM-DD)"
        );
    }
}
