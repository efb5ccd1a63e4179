//! Transaction record types: untrusted input rows and validated ledger entries

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Kind {
    Deposit,
    Withdrawal,
}

impl Kind {
    /// Accept only the two literal labels. Case variants, typos and padding are rejected.
    pub fn parse(label: &str) -> Option<Kind> {
        match label {
            "Deposit" => Some(Kind::Deposit),
            "Withdrawal" => Some(Kind::Withdrawal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Deposit => "Deposit",
            Kind::Withdrawal => "Withdrawal",
        }
    }

    /// Withdrawals raise the tracked net position, deposits lower it.
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            Kind::Deposit => -amount,
            Kind::Withdrawal => amount,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One untrusted row as handed over by a CSV reader or the profile store.
/// Any field may be malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawRow {
    pub date: String,
    pub kind: String,
    pub amount: String,
}

impl RawRow {
    pub fn new(date: impl Into<String>, kind: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            kind: kind.into(),
            amount: amount.into(),
        }
    }

    /// Blank padding rows (every field empty after trimming) are not errors.
    pub fn is_blank(&self) -> bool {
        self.date.trim().is_empty() && self.kind.trim().is_empty() && self.amount.trim().is_empty()
    }
}

/// A validated transaction positioned in the ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    /// Date as supplied (trimmed), kept for display and month keys
    pub date: String,
    /// Parsed instant used for ordering and day arithmetic
    pub at: NaiveDateTime,
    pub kind: Kind,
    /// Always >= 0; the sign lives in `kind`
    pub amount: f64,
    /// `+amount` for withdrawals, `-amount` for deposits
    pub signed_delta: f64,
    /// Cumulative `signed_delta` over the full ledger up to and including this entry.
    /// Filtering never recomputes it.
    pub running_balance: f64,
}

impl LedgerEntry {
    /// `YYYY-MM` bucket key
    pub fn month_key(&self) -> String {
        self.at.format("%Y-%m").to_string()
    }

    pub fn is_deposit(&self) -> bool {
        self.kind == Kind::Deposit
    }

    pub fn is_withdrawal(&self) -> bool {
        self.kind == Kind::Withdrawal
    }
}
