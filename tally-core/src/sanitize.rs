//! Row sanitizer: turns one untrusted `RawRow` into a `LedgerEntry` or rejects it.
//!
//! Nothing here fails loudly. Rejection is `None`, and `row_issues` exposes the
//! same acceptance rules to upstream validators that report per-line problems.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

use crate::entry::{Kind, LedgerEntry, RawRow};

/// Why a row would be dropped by the ledger builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIssue {
    InvalidDate,
    InvalidKind,
    InvalidAmount,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RowIssue::InvalidDate => "invalid date",
            RowIssue::InvalidKind => "type must be Deposit or Withdrawal",
            RowIssue::InvalidAmount => "amount must be numeric",
        };
        f.write_str(msg)
    }
}

/// Sanitize an amount label like `"€ 1 250,50"` or `"-25€"` into a non-negative number.
///
/// Steps: drop the euro glyph and all whitespace, turn the first comma into a
/// period, drop everything that is not a digit, period or minus, then read the
/// longest numeric prefix. The sign is discarded.
pub fn sanitize_amount(raw: &str) -> Option<f64> {
    let compact: String = raw
        .chars()
        .filter(|c| *c != '€' && !c.is_whitespace())
        .collect();

    let normalized: String = compact
        .replacen(',', ".", 1)
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let number = numeric_prefix(&normalized)?;
    let value: f64 = number.parse().ok()?;
    value.is_finite().then(|| value.abs())
}

/// Longest `-?digits[.digits]` prefix holding at least one digit.
fn numeric_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = usize::from(bytes.first() == Some(&b'-'));

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    (digits > 0).then(|| &s[..end])
}

/// Parse a transaction date with strict calendar validation.
///
/// Accepted: `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DD HH:MM:SS[.fff]`
/// and RFC 3339 (wall-clock time kept). Nonexistent days like `2024-02-30` are rejected.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0);
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local())
}

/// Every reason this row would be rejected, in date/kind/amount order.
/// Empty means the row survives sanitization.
pub fn row_issues(row: &RawRow) -> Vec<RowIssue> {
    let mut issues = Vec::new();
    if parse_date(&row.date).is_none() {
        issues.push(RowIssue::InvalidDate);
    }
    if Kind::parse(&row.kind).is_none() {
        issues.push(RowIssue::InvalidKind);
    }
    if sanitize_amount(&row.amount).is_none() {
        issues.push(RowIssue::InvalidAmount);
    }
    issues
}

/// Validate one row. The running balance is left at zero; the ledger builder owns it.
pub fn sanitize_row(row: &RawRow) -> Option<LedgerEntry> {
    let at = parse_date(&row.date)?;
    let kind = Kind::parse(&row.kind)?;
    let amount = sanitize_amount(&row.amount)?;

    Some(LedgerEntry {
        date: row.date.trim().to_string(),
        at,
        kind,
        amount,
        signed_delta: kind.signed(amount),
        running_balance: 0.0,
    })
}
