//! Side-by-side comparison of two profiles' statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::stats::Statistics;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Side {
    A,
    B,
    Tie,
}

/// One compared metric
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRow {
    pub metric: String,
    pub a: f64,
    pub b: f64,
    /// `b - a`
    pub difference: f64,
    /// Which side looks better for this metric
    pub better: Side,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthPair {
    pub month: String,
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comparison {
    pub metrics: Vec<MetricRow>,
    /// Union of both profiles' months, chronological; a missing month counts as 0
    pub monthly: Vec<MonthPair>,
    /// Overall leader on net result, ROI and win rate; `Tie` when they split evenly
    pub overall: Side,
}

pub fn compare_profiles(a: &Statistics, b: &Statistics) -> Comparison {
    let metrics = vec![
        row("Net result", a.net_result, b.net_result, false),
        row("ROI", a.roi, b.roi, false),
        row("Win rate", a.win_rate, b.win_rate, false),
        // less money put in reads as the better position
        row("Total deposited", a.total_deposited, b.total_deposited, true),
        row("Total withdrawn", a.total_withdrawn, b.total_withdrawn, false),
        row(
            "Transactions",
            (a.deposit_count + a.withdrawal_count) as f64,
            (b.deposit_count + b.withdrawal_count) as f64,
            false,
        ),
        row("Average deposit", a.avg_deposit, b.avg_deposit, true),
        row("Average withdrawal", a.avg_withdrawal, b.avg_withdrawal, false),
    ];

    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for m in &a.monthly {
        months.entry(m.month.clone()).or_default().0 = m.net;
    }
    for m in &b.monthly {
        months.entry(m.month.clone()).or_default().1 = m.net;
    }
    let monthly = months
        .into_iter()
        .map(|(month, (a, b))| MonthPair { month, a, b })
        .collect();

    let headline = [
        (a.net_result, b.net_result),
        (a.roi, b.roi),
        (a.win_rate, b.win_rate),
    ];
    let score_a = headline.iter().filter(|(x, y)| x > y).count();
    let score_b = headline.iter().filter(|(x, y)| y > x).count();
    let overall = leader(score_a as f64, score_b as f64);

    Comparison {
        metrics,
        monthly,
        overall,
    }
}

fn row(metric: &str, a: f64, b: f64, lower_is_better: bool) -> MetricRow {
    let better = if lower_is_better {
        leader(b, a)
    } else {
        leader(a, b)
    };
    MetricRow {
        metric: metric.to_string(),
        a,
        b,
        difference: b - a,
        better,
    }
}

fn leader(a: f64, b: f64) -> Side {
    if a > b {
        Side::A
    } else if b > a {
        Side::B
    } else {
        Side::Tie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::compute_statistics;
    use tally_core::{RawRow, build_ledger};

    fn stats(rows: &[(&str, &str, &str)]) -> Statistics {
        let raw: Vec<RawRow> = rows.iter().map(|(d, k, a)| RawRow::new(*d, *k, *a)).collect();
        compute_statistics(&build_ledger(&raw))
    }

    #[test]
    fn test_compare_picks_overall_leader() {
        let winner = stats(&[
            ("2024-01-01", "Deposit", "100"),
            ("2024-01-10", "Withdrawal", "200"),
        ]);
        let loser = stats(&[
            ("2024-01-01", "Deposit", "100"),
            ("2024-02-10", "Withdrawal", "50"),
        ]);

        let cmp = compare_profiles(&winner, &loser);
        assert_eq!(cmp.overall, Side::A);

        let net = &cmp.metrics[0];
        assert_eq!(net.metric, "Net result");
        assert_eq!(net.a, 100.0);
        assert_eq!(net.b, -50.0);
        assert_eq!(net.difference, -150.0);
        assert_eq!(net.better, Side::A);
    }

    #[test]
    fn test_deposits_lower_is_better() {
        let small = stats(&[("2024-01-01", "Deposit", "10")]);
        let big = stats(&[("2024-01-01", "Deposit", "90")]);
        let cmp = compare_profiles(&small, &big);
        let deposited = cmp.metrics.iter().find(|m| m.metric == "Total deposited").unwrap();
        assert_eq!(deposited.better, Side::A);
    }

    #[test]
    fn test_monthly_union() {
        let a = stats(&[("2024-01-01", "Withdrawal", "10")]);
        let b = stats(&[("2024-03-01", "Deposit", "5")]);
        let cmp = compare_profiles(&a, &b);
        assert_eq!(cmp.monthly.len(), 2);
        assert_eq!(cmp.monthly[0], MonthPair { month: "2024-01".into(), a: 10.0, b: 0.0 });
        assert_eq!(cmp.monthly[1], MonthPair { month: "2024-03".into(), a: 0.0, b: -5.0 });
    }

    #[test]
    fn test_identical_profiles_tie() {
        let a = stats(&[("2024-01-01", "Deposit", "10")]);
        let cmp = compare_profiles(&a, &a.clone());
        assert_eq!(cmp.overall, Side::Tie);
        assert!(cmp.metrics.iter().all(|m| m.better == Side::Tie));
    }
}
