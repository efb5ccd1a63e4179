//! Deterministic insight rules over a computed statistics snapshot.
//!
//! Rules run in the fixed order of `Rule::ALL`. Each one looks only at the
//! statistics and the entries, never at another rule's output. Priority is the
//! dense index among the rules that fired, so the first insight is always 0.

use serde::{Deserialize, Serialize};
use tally_core::{Kind, LedgerEntry};
use tracing::debug;

use crate::format::{format_currency, format_percent, month_label};
use crate::stats::{Statistics, Trend};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Performance,
    Pattern,
    Recommendation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightLevel {
    Success,
    Warning,
    Danger,
    Info,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendArrow {
    Up,
    Down,
    Stable,
}

/// A ranked, human-readable observation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Insight {
    pub id: String,
    pub category: InsightCategory,
    #[serde(rename = "type")]
    pub level: InsightLevel,
    /// Icon name understood by the presentation layer
    pub icon: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendArrow>,
    /// Ascending = more important
    pub priority: usize,
}

impl Insight {
    fn new(
        id: &str,
        category: InsightCategory,
        level: InsightLevel,
        icon: &str,
        title: &str,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.to_string(),
            category,
            level,
            icon: icon.to_string(),
            title: title.to_string(),
            value: None,
            description: description.into(),
            trend: None,
            priority: 0,
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    fn with_trend(mut self, trend: TrendArrow) -> Self {
        self.trend = Some(trend);
        self
    }
}

/// The rule chain, in evaluation (and therefore priority) order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Roi,
    WinRate,
    Trend,
    Frequency,
    MostActiveMonth,
    ProfitStreak,
    LargestTransaction,
    ActivityRatio,
    Volatility,
}

impl Rule {
    pub const ALL: [Rule; 9] = [
        Rule::Roi,
        Rule::WinRate,
        Rule::Trend,
        Rule::Frequency,
        Rule::MostActiveMonth,
        Rule::ProfitStreak,
        Rule::LargestTransaction,
        Rule::ActivityRatio,
        Rule::Volatility,
    ];

    /// Decide whether this rule emits, and what.
    pub fn evaluate(self, stats: &Statistics, entries: &[LedgerEntry]) -> Option<Insight> {
        match self {
            Rule::Roi => roi(stats),
            Rule::WinRate => win_rate(stats),
            Rule::Trend => trend(stats),
            Rule::Frequency => frequency(stats, entries),
            Rule::MostActiveMonth => most_active_month(stats),
            Rule::ProfitStreak => profit_streak(stats),
            Rule::LargestTransaction => largest_transaction(stats),
            Rule::ActivityRatio => activity_ratio(stats),
            Rule::Volatility => volatility(stats),
        }
    }
}

/// Run every rule in order and number the ones that fired 0, 1, 2, ...
pub fn generate_insights(stats: &Statistics, entries: &[LedgerEntry]) -> Vec<Insight> {
    let insights: Vec<Insight> = Rule::ALL
        .iter()
        .filter_map(|rule| rule.evaluate(stats, entries))
        .enumerate()
        .map(|(priority, mut insight)| {
            insight.priority = priority;
            insight
        })
        .collect();

    debug!(fired = insights.len(), "generated insights");
    insights
}

fn roi(stats: &Statistics) -> Option<Insight> {
    if stats.roi == 0.0 {
        return None;
    }

    let insight = if stats.roi > 0.0 {
        Insight::new(
            "roi",
            InsightCategory::Performance,
            InsightLevel::Success,
            "TrendingUp",
            "Positive ROI",
            format!(
                "You withdrew {} more than you deposited. Keep it up!",
                format_currency(stats.net_result)
            ),
        )
        .with_trend(TrendArrow::Up)
    } else {
        Insight::new(
            "roi",
            InsightCategory::Performance,
            InsightLevel::Danger,
            "TrendingDown",
            "Negative ROI",
            format!(
                "You are {} down against your deposits. Consider reviewing your strategy.",
                format_currency(stats.net_result.abs())
            ),
        )
        .with_trend(TrendArrow::Down)
    };

    Some(insight.with_value(format_percent(stats.roi, 1)))
}

fn win_rate(stats: &Statistics) -> Option<Insight> {
    let months = stats.monthly.len();
    if months == 0 {
        return None;
    }

    let (level, description) = if stats.win_rate >= 50.0 {
        (
            InsightLevel::Success,
            format!("{} of {months} months closed in profit.", stats.profitable_months),
        )
    } else {
        (
            InsightLevel::Warning,
            format!(
                "Only {} of {months} months closed in profit. There is room to improve.",
                stats.profitable_months
            ),
        )
    };

    Some(
        Insight::new(
            "win-rate",
            InsightCategory::Performance,
            level,
            "Target",
            "Win rate",
            description,
        )
        .with_value(format!("{:.0}%", stats.win_rate)),
    )
}

fn trend(stats: &Statistics) -> Option<Insight> {
    if stats.trend_value.abs() <= 5.0 {
        return None;
    }

    let insight = if stats.trend == Trend::Improving {
        Insight::new(
            "trend",
            InsightCategory::Performance,
            InsightLevel::Success,
            "ArrowUpRight",
            "Improving trend",
            format!(
                "Your last 3 months average {} per month, above the {} baseline.",
                format_currency(stats.last3_months_avg),
                format_currency(stats.previous_avg)
            ),
        )
        .with_trend(TrendArrow::Up)
    } else {
        Insight::new(
            "trend",
            InsightCategory::Performance,
            InsightLevel::Danger,
            "ArrowDownRight",
            "Declining trend",
            format!(
                "Your last 3 months average {} per month, below the {} baseline.",
                format_currency(stats.last3_months_avg),
                format_currency(stats.previous_avg)
            ),
        )
        .with_trend(TrendArrow::Down)
    };

    Some(insight.with_value(format_percent(stats.trend_value, 1)))
}

fn frequency(stats: &Statistics, entries: &[LedgerEntry]) -> Option<Insight> {
    if entries.len() <= 1 {
        return None;
    }

    let days = stats.avg_days_between_transactions;
    Some(
        Insight::new(
            "frequency",
            InsightCategory::Pattern,
            InsightLevel::Info,
            "Calendar",
            "Transaction frequency",
            format!(
                "On average you make a transaction every {days:.1} days across {} transactions.",
                entries.len()
            ),
        )
        .with_value(format!("{days:.1} days")),
    )
}

fn most_active_month(stats: &Statistics) -> Option<Insight> {
    let active = stats.most_active_month.as_ref()?;
    let label = month_label(&active.month);

    Some(
        Insight::new(
            "most-active-month",
            InsightCategory::Pattern,
            InsightLevel::Info,
            "Activity",
            "Most active month",
            format!("{label} was your busiest month with {} transactions.", active.count),
        )
        .with_value(label),
    )
}

/// Longest run of consecutive months with positive net, in chronological order.
pub fn best_profit_streak(stats: &Statistics) -> usize {
    let mut best = 0;
    let mut run = 0;
    for month in &stats.monthly {
        if month.net > 0.0 {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

fn profit_streak(stats: &Statistics) -> Option<Insight> {
    if stats.monthly.len() < 2 {
        return None;
    }
    let streak = best_profit_streak(stats);
    if streak < 2 {
        return None;
    }

    Some(
        Insight::new(
            "profit-streak",
            InsightCategory::Pattern,
            InsightLevel::Success,
            "Flame",
            "Winning streak",
            format!("Your best run was {streak} profitable months in a row."),
        )
        .with_value(format!("{streak} months")),
    )
}

fn largest_transaction(stats: &Statistics) -> Option<Insight> {
    let largest = stats.largest_transaction.as_ref()?;

    let (level, noun) = match largest.kind {
        Kind::Withdrawal => (InsightLevel::Success, "withdrawal"),
        Kind::Deposit => (InsightLevel::Info, "deposit"),
    };
    let amount = format_currency(largest.amount);

    Some(
        Insight::new(
            "largest-transaction",
            InsightCategory::Pattern,
            level,
            "DollarSign",
            "Largest transaction",
            format!("Your largest transaction was a {noun} of {amount} on {}.", largest.date),
        )
        .with_value(amount),
    )
}

/// Withdrawals per deposit, 0 when there are no deposits.
pub fn withdrawal_ratio(stats: &Statistics) -> f64 {
    if stats.deposit_count > 0 {
        stats.withdrawal_count as f64 / stats.deposit_count as f64
    } else {
        0.0
    }
}

fn activity_ratio(stats: &Statistics) -> Option<Insight> {
    let ratio = withdrawal_ratio(stats);

    if ratio > 1.5 {
        Some(
            Insight::new(
                "good-management",
                InsightCategory::Recommendation,
                InsightLevel::Success,
                "ThumbsUp",
                "Good bankroll management",
                format!("You make {ratio:.1}× more withdrawals than deposits."),
            )
            .with_value(format!("{ratio:.1}×")),
        )
    } else if ratio < 0.5 && stats.deposit_count > 2 {
        Some(
            Insight::new(
                "bankroll-attention",
                InsightCategory::Recommendation,
                InsightLevel::Warning,
                "AlertTriangle",
                "Watch your bankroll",
                format!(
                    "You made {} deposits but only {} withdrawals. Keep an eye on how much you put in.",
                    stats.deposit_count, stats.withdrawal_count
                ),
            )
            .with_value(format!("{ratio:.1}×")),
        )
    } else {
        None
    }
}

/// Coefficient of variation of monthly net, in percent (population deviation).
pub fn monthly_volatility(stats: &Statistics) -> f64 {
    let n = stats.monthly.len();
    if n == 0 {
        return 0.0;
    }
    let mean = stats.monthly.iter().map(|m| m.net).sum::<f64>() / n as f64;
    let variance = stats
        .monthly
        .iter()
        .map(|m| (m.net - mean).powi(2))
        .sum::<f64>()
        / n as f64;

    if mean.abs() > 0.0 {
        variance.sqrt() / mean.abs() * 100.0
    } else {
        0.0
    }
}

fn volatility(stats: &Statistics) -> Option<Insight> {
    if stats.monthly.len() < 3 || monthly_volatility(stats) <= 150.0 {
        return None;
    }

    Some(Insight::new(
        "volatility",
        InsightCategory::Recommendation,
        InsightLevel::Warning,
        "AlertTriangle",
        "High volatility",
        "Your monthly results swing a lot from one month to the next.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{MonthBucket, compute_statistics};
    use tally_core::{RawRow, build_ledger};

    fn ledger(rows: &[(&str, &str, &str)]) -> Vec<LedgerEntry> {
        let raw: Vec<RawRow> = rows.iter().map(|(d, k, a)| RawRow::new(*d, *k, *a)).collect();
        build_ledger(&raw)
    }

    fn ids(insights: &[Insight]) -> Vec<&str> {
        insights.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_priorities_are_dense() {
        let entries = ledger(&[
            ("2024-01-01", "Deposit", "100"),
            ("2024-01-15", "Withdrawal", "160"),
            ("2024-02-01", "Deposit", "50"),
            ("2024-02-20", "Withdrawal", "90"),
        ]);
        let stats = compute_statistics(&entries);
        for (i, insight) in stats.insights.iter().enumerate() {
            assert_eq!(insight.priority, i);
        }
        assert_eq!(stats.insights[0].id, "roi");
    }

    #[test]
    fn test_single_flat_deposit() {
        let stats = compute_statistics(&ledger(&[("2024-01-01", "Deposit", "100")]));
        // ROI -100%, win rate 0 of 1, most active month, largest transaction
        assert_eq!(
            ids(&stats.insights),
            vec!["roi", "win-rate", "most-active-month", "largest-transaction"]
        );
        assert_eq!(stats.insights[0].level, InsightLevel::Danger);
        assert_eq!(stats.insights[1].level, InsightLevel::Warning);
        assert_eq!(stats.insights[3].level, InsightLevel::Info);
        assert_eq!(stats.insights[3].priority, 3);
    }

    #[test]
    fn test_no_insights_for_empty_input() {
        assert!(compute_statistics(&[]).insights.is_empty());
    }

    #[test]
    fn test_roi_zero_skips_rule() {
        let stats = compute_statistics(&ledger(&[
            ("2024-01-01", "Deposit", "100"),
            ("2024-01-02", "Withdrawal", "100"),
        ]));
        assert!(!ids(&stats.insights).contains(&"roi"));
        assert_eq!(stats.insights[0].id, "win-rate");
        assert_eq!(stats.insights[0].priority, 0);
    }

    #[test]
    fn test_roi_positive_is_success() {
        let stats = compute_statistics(&ledger(&[
            ("2024-01-01", "Deposit", "100"),
            ("2024-01-02", "Withdrawal", "120"),
        ]));
        let roi = &stats.insights[0];
        assert_eq!(roi.level, InsightLevel::Success);
        assert_eq!(roi.value.as_deref(), Some("+20.0%"));
        assert_eq!(roi.trend, Some(TrendArrow::Up));
        assert_eq!(roi.category, InsightCategory::Performance);
    }

    #[test]
    fn test_trend_exactly_five_does_not_fire() {
        let mut stats = compute_statistics(&[]);
        stats.trend_value = 5.0;
        assert!(Rule::Trend.evaluate(&stats, &[]).is_none());
        stats.trend_value = -5.0;
        assert!(Rule::Trend.evaluate(&stats, &[]).is_none());
        stats.trend_value = -5.5;
        stats.trend = Trend::Declining;
        let insight = Rule::Trend.evaluate(&stats, &[]).unwrap();
        assert_eq!(insight.level, InsightLevel::Danger);
        assert_eq!(insight.trend, Some(TrendArrow::Down));
    }

    #[test]
    fn test_streak_rule() {
        let entries = ledger(&[
            ("2024-01-05", "Withdrawal", "10"),
            ("2024-02-05", "Withdrawal", "10"),
            ("2024-03-05", "Deposit", "10"),
            ("2024-04-05", "Withdrawal", "10"),
        ]);
        let stats = compute_statistics(&entries);
        assert_eq!(best_profit_streak(&stats), 2);
        let streak = stats.insights.iter().find(|i| i.id == "profit-streak").unwrap();
        assert_eq!(streak.value.as_deref(), Some("2 months"));
        assert_eq!(streak.level, InsightLevel::Success);
    }

    #[test]
    fn test_streak_needs_two_in_a_row() {
        let stats = compute_statistics(&ledger(&[
            ("2024-01-05", "Withdrawal", "10"),
            ("2024-02-05", "Deposit", "10"),
            ("2024-03-05", "Withdrawal", "10"),
        ]));
        assert_eq!(best_profit_streak(&stats), 1);
        assert!(!ids(&stats.insights).contains(&"profit-streak"));
    }

    #[test]
    fn test_largest_withdrawal_is_success() {
        let stats = compute_statistics(&ledger(&[
            ("2024-01-01", "Deposit", "10"),
            ("2024-01-02", "Withdrawal", "500"),
        ]));
        let largest = stats.insights.iter().find(|i| i.id == "largest-transaction").unwrap();
        assert_eq!(largest.level, InsightLevel::Success);
        assert_eq!(largest.value.as_deref(), Some("€500.00"));
    }

    #[test]
    fn test_good_management_ratio() {
        // 4 withdrawals / 2 deposits = 2.0
        let stats = compute_statistics(&ledger(&[
            ("2024-01-01", "Deposit", "10"),
            ("2024-01-02", "Withdrawal", "10"),
            ("2024-01-03", "Withdrawal", "10"),
            ("2024-01-04", "Deposit", "10"),
            ("2024-01-05", "Withdrawal", "10"),
            ("2024-01-06", "Withdrawal", "10"),
        ]));
        assert_eq!(withdrawal_ratio(&stats), 2.0);
        let found = ids(&stats.insights);
        assert!(found.contains(&"good-management"));
        assert!(!found.contains(&"bankroll-attention"));
    }

    #[test]
    fn test_attention_ratio() {
        // 3 withdrawals / 10 deposits = 0.3
        let mut rows: Vec<(String, &str, &str)> = (1..=10)
            .map(|d| (format!("2024-01-{d:02}"), "Deposit", "20"))
            .collect();
        rows.extend((11..=13).map(|d| (format!("2024-01-{d:02}"), "Withdrawal", "5")));
        let borrowed: Vec<(&str, &str, &str)> = rows.iter().map(|(d, k, a)| (d.as_str(), *k, *a)).collect();

        let stats = compute_statistics(&ledger(&borrowed));
        assert!((withdrawal_ratio(&stats) - 0.3).abs() < 1e-9);
        let found = ids(&stats.insights);
        assert!(found.contains(&"bankroll-attention"));
        assert!(!found.contains(&"good-management"));
    }

    #[test]
    fn test_attention_needs_more_than_two_deposits() {
        let stats = compute_statistics(&ledger(&[
            ("2024-01-01", "Deposit", "10"),
            ("2024-01-02", "Deposit", "10"),
        ]));
        assert!(!ids(&stats.insights).contains(&"bankroll-attention"));
    }

    #[test]
    fn test_ratio_in_band_emits_nothing() {
        let stats = compute_statistics(&ledger(&[
            ("2024-01-01", "Deposit", "10"),
            ("2024-01-02", "Withdrawal", "10"),
        ]));
        let found = ids(&stats.insights);
        assert!(!found.contains(&"good-management"));
        assert!(!found.contains(&"bankroll-attention"));
    }

    #[test]
    fn test_volatility_warning() {
        // monthly nets: +100, -90, +5 -> mean 5, large spread
        let stats = compute_statistics(&ledger(&[
            ("2024-01-01", "Withdrawal", "100"),
            ("2024-02-01", "Deposit", "90"),
            ("2024-03-01", "Withdrawal", "5"),
        ]));
        assert!(monthly_volatility(&stats) > 150.0);
        let volatility = stats.insights.iter().find(|i| i.id == "volatility").unwrap();
        assert_eq!(volatility.level, InsightLevel::Warning);
        assert!(volatility.value.is_none());
        assert_eq!(volatility.priority, stats.insights.len() - 1);
    }

    #[test]
    fn test_steady_months_not_volatile() {
        let stats = compute_statistics(&ledger(&[
            ("2024-01-01", "Withdrawal", "100"),
            ("2024-02-01", "Withdrawal", "110"),
            ("2024-03-01", "Withdrawal", "90"),
        ]));
        assert!(monthly_volatility(&stats) < 150.0);
        assert!(!ids(&stats.insights).contains(&"volatility"));
    }

    fn months(nets: &[f64]) -> Vec<MonthBucket> {
        nets.iter()
            .enumerate()
            .map(|(i, net)| MonthBucket {
                month: format!("2024-{:02}", i + 1),
                net: *net,
            })
            .collect()
    }

    #[test]
    fn test_win_rate_fifty_is_success() {
        let mut stats = compute_statistics(&[]);
        stats.monthly = months(&[10.0, -10.0]);
        stats.profitable_months = 1;
        stats.win_rate = 50.0;
        let insight = Rule::WinRate.evaluate(&stats, &[]).unwrap();
        assert_eq!(insight.level, InsightLevel::Success);

        stats.win_rate = 49.9;
        let insight = Rule::WinRate.evaluate(&stats, &[]).unwrap();
        assert_eq!(insight.level, InsightLevel::Warning);
    }

    #[test]
    fn test_ratio_bounds_are_exclusive() {
        let mut stats = compute_statistics(&[]);

        // 3 / 2 = 1.5
        stats.deposit_count = 2;
        stats.withdrawal_count = 3;
        assert!(Rule::ActivityRatio.evaluate(&stats, &[]).is_none());

        stats.withdrawal_count = 4;
        let insight = Rule::ActivityRatio.evaluate(&stats, &[]).unwrap();
        assert_eq!(insight.id, "good-management");

        // 2 / 4 = 0.5
        stats.deposit_count = 4;
        stats.withdrawal_count = 2;
        assert!(Rule::ActivityRatio.evaluate(&stats, &[]).is_none());
    }

    #[test]
    fn test_attention_at_three_deposits() {
        let mut stats = compute_statistics(&[]);
        stats.deposit_count = 3;
        stats.withdrawal_count = 1;
        let insight = Rule::ActivityRatio.evaluate(&stats, &[]).unwrap();
        assert_eq!(insight.id, "bankroll-attention");
        assert_eq!(insight.value.as_deref(), Some("0.3×"));

        stats.deposit_count = 2;
        stats.withdrawal_count = 0;
        assert!(Rule::ActivityRatio.evaluate(&stats, &[]).is_none());
    }

    #[test]
    fn test_volatility_threshold_is_exclusive() {
        let mut stats = compute_statistics(&[]);
        // mean 2, deviation 3 -> exactly 150%
        stats.monthly = months(&[5.0, -1.0, 5.0, -1.0]);
        assert_eq!(monthly_volatility(&stats), 150.0);
        assert!(Rule::Volatility.evaluate(&stats, &[]).is_none());

        stats.monthly = months(&[5.0, -1.1, 5.0, -1.1]);
        assert!(monthly_volatility(&stats) > 150.0);
        assert!(Rule::Volatility.evaluate(&stats, &[]).is_some());
    }

    #[test]
    fn test_volatility_needs_three_months() {
        let mut stats = compute_statistics(&[]);
        stats.monthly = months(&[5.0, -1.1]);
        assert!(monthly_volatility(&stats) > 150.0);
        assert!(Rule::Volatility.evaluate(&stats, &[]).is_none());
    }

    #[test]
    fn test_insight_json_shape() {
        let stats = compute_statistics(&ledger(&[("2024-01-01", "Deposit", "100")]));
        let json = serde_json::to_value(&stats.insights[0]).unwrap();
        assert_eq!(json["type"], "danger");
        assert_eq!(json["category"], "performance");
        assert_eq!(json["trend"], "down");
        assert_eq!(json["priority"], 0);

        let win_rate = serde_json::to_value(&stats.insights[1]).unwrap();
        assert!(win_rate.get("trend").is_none());
    }
}
