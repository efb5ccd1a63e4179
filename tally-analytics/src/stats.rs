//! Statistics engine: a full, from-scratch snapshot over whatever entries are passed in.
//!
//! Every zero-denominator case (ROI, MoM, trend, averages) resolves to 0, and an
//! empty entry set produces a well-formed, zeroed snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tally_core::{Kind, LedgerEntry};
use tracing::debug;

use crate::insights::{Insight, generate_insights};

/// Net result of one calendar month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthBucket {
    /// `YYYY-MM`
    pub month: String,
    pub net: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MomChange {
    pub month: String,
    /// Percent change against the previous month, 0 when the previous month netted 0
    pub change: f64,
    pub previous_value: f64,
    pub current_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistogramBucket {
    pub range: String,
    pub min_value: f64,
    /// `None` for the open-ended top bracket
    pub max_value: Option<f64>,
    pub count: usize,
    pub deposits: usize,
    pub withdrawals: usize,
}

impl HistogramBucket {
    fn bracket(range: &str, min_value: f64, max_value: Option<f64>) -> Self {
        Self {
            range: range.to_string(),
            min_value,
            max_value,
            count: 0,
            deposits: 0,
            withdrawals: 0,
        }
    }

    /// `min <= amount < max`
    fn holds(&self, amount: f64) -> bool {
        amount >= self.min_value && self.max_value.is_none_or(|max| amount < max)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    fn classify(trend_value: f64) -> Self {
        if trend_value > 5.0 {
            Trend::Improving
        } else if trend_value < -5.0 {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LargestTransaction {
    pub kind: Kind,
    pub amount: f64,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MostActiveMonth {
    pub month: String,
    pub count: usize,
}

/// A point in time on the running-balance curve
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceMoment {
    pub date: String,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistributionSlice {
    pub name: String,
    pub value: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statistics {
    pub total_deposited: f64,
    pub total_withdrawn: f64,
    /// `total_withdrawn - total_deposited`
    pub net_result: f64,
    pub deposit_count: usize,
    pub withdrawal_count: usize,
    pub max_deposit: f64,
    pub max_withdrawal: f64,
    pub avg_deposit: f64,
    pub avg_withdrawal: f64,

    /// Chronological month buckets
    pub monthly: Vec<MonthBucket>,
    pub best_month: Option<MonthBucket>,
    pub worst_month: Option<MonthBucket>,

    pub roi: f64,
    pub win_rate: f64,
    pub profitable_months: usize,
    pub trend: Trend,
    pub trend_value: f64,
    pub last3_months_avg: f64,
    /// Baseline the last three months are compared against
    pub previous_avg: f64,
    pub overall_avg: f64,
    pub mom_changes: Vec<MomChange>,
    pub histogram: Vec<HistogramBucket>,
    pub avg_days_between_transactions: f64,
    pub largest_transaction: Option<LargestTransaction>,
    pub most_active_month: Option<MostActiveMonth>,
    pub distribution: Vec<DistributionSlice>,

    pub peak_moment: Option<BalanceMoment>,
    pub valley_moment: Option<BalanceMoment>,

    /// Ordered by ascending `priority`
    pub insights: Vec<Insight>,
}

/// Compute the full statistics snapshot, insights included.
pub fn compute_statistics(entries: &[LedgerEntry]) -> Statistics {
    let deposits: Vec<&LedgerEntry> = entries.iter().filter(|e| e.is_deposit()).collect();
    let withdrawals: Vec<&LedgerEntry> = entries.iter().filter(|e| e.is_withdrawal()).collect();

    let total_deposited: f64 = deposits.iter().map(|e| e.amount).sum();
    let total_withdrawn: f64 = withdrawals.iter().map(|e| e.amount).sum();
    let net_result = total_withdrawn - total_deposited;

    let groups = month_groups(entries);
    let mut monthly: Vec<MonthBucket> = groups
        .iter()
        .map(|g| MonthBucket {
            month: g.month.clone(),
            net: g.net,
        })
        .collect();
    monthly.sort_by(|a, b| a.month.cmp(&b.month));

    let best_month = first_max_by(monthly.iter(), |m| m.net).cloned();
    let worst_month = first_min_by(monthly.iter(), |m| m.net).cloned();

    let roi = if total_deposited != 0.0 {
        (total_withdrawn - total_deposited) / total_deposited * 100.0
    } else {
        0.0
    };

    let profitable_months = monthly.iter().filter(|m| m.net > 0.0).count();
    let win_rate = ratio_percent(profitable_months as f64, monthly.len() as f64);

    let window = trend_window(&monthly);

    let largest_transaction = first_max_by(deposits.iter().chain(withdrawals.iter()), |e| e.amount)
        .map(|e| LargestTransaction {
            kind: e.kind,
            amount: e.amount,
            date: e.date.clone(),
        });

    let most_active_month = groups
        .iter()
        .fold(None::<&MonthGroup>, |best, g| match best {
            Some(b) if g.count <= b.count => Some(b),
            _ => Some(g),
        })
        .map(|g| MostActiveMonth {
            month: g.month.clone(),
            count: g.count,
        });

    let distribution = vec![
        DistributionSlice {
            name: "Deposits".to_string(),
            value: total_deposited,
            count: deposits.len(),
        },
        DistributionSlice {
            name: "Withdrawals".to_string(),
            value: total_withdrawn,
            count: withdrawals.len(),
        },
    ];

    let peak_moment = first_max_by(entries.iter(), |e| e.running_balance).map(moment);
    let valley_moment = first_min_by(entries.iter(), |e| e.running_balance).map(moment);

    let mut stats = Statistics {
        total_deposited,
        total_withdrawn,
        net_result,
        deposit_count: deposits.len(),
        withdrawal_count: withdrawals.len(),
        max_deposit: deposits.iter().map(|e| e.amount).fold(0.0, f64::max),
        max_withdrawal: withdrawals.iter().map(|e| e.amount).fold(0.0, f64::max),
        avg_deposit: ratio(total_deposited, deposits.len() as f64),
        avg_withdrawal: ratio(total_withdrawn, withdrawals.len() as f64),
        mom_changes: mom_changes(&monthly),
        best_month,
        worst_month,
        roi,
        win_rate,
        profitable_months,
        trend: Trend::classify(window.trend_value),
        trend_value: window.trend_value,
        last3_months_avg: window.last3_avg,
        previous_avg: window.previous_avg,
        overall_avg: window.overall_avg,
        histogram: histogram(entries),
        avg_days_between_transactions: avg_days_between(entries),
        largest_transaction,
        most_active_month,
        distribution,
        peak_moment,
        valley_moment,
        monthly,
        insights: Vec::new(),
    };

    stats.insights = generate_insights(&stats, entries);

    debug!(
        entries = entries.len(),
        months = stats.monthly.len(),
        insights = stats.insights.len(),
        "computed statistics"
    );
    stats
}

struct MonthGroup {
    month: String,
    net: f64,
    count: usize,
}

/// Month groups in order of first appearance
fn month_groups(entries: &[LedgerEntry]) -> Vec<MonthGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<MonthGroup> = Vec::new();

    for e in entries {
        let key = e.month_key();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(MonthGroup {
                month: key,
                net: 0.0,
                count: 0,
            });
            groups.len() - 1
        });
        groups[slot].net += e.signed_delta;
        groups[slot].count += 1;
    }

    groups
}

struct TrendWindow {
    last3_avg: f64,
    previous_avg: f64,
    overall_avg: f64,
    trend_value: f64,
}

/// Last three months against the three before them. With four or five months
/// of history the overall average stands in as the baseline; with three or
/// fewer there is no baseline and the trend is flat.
fn trend_window(monthly: &[MonthBucket]) -> TrendWindow {
    let n = monthly.len();
    let last3 = &monthly[n.saturating_sub(3)..];
    let prior = &monthly[n.saturating_sub(6)..n.saturating_sub(3)];

    let last3_avg = mean_net(last3);
    let overall_avg = mean_net(monthly);
    let previous_avg = if prior.len() >= 3 {
        mean_net(prior)
    } else if n > 3 {
        overall_avg
    } else {
        0.0
    };

    let trend_value = if previous_avg != 0.0 {
        (last3_avg - previous_avg) / previous_avg.abs() * 100.0
    } else {
        0.0
    };

    TrendWindow {
        last3_avg,
        previous_avg,
        overall_avg,
        trend_value,
    }
}

fn mom_changes(monthly: &[MonthBucket]) -> Vec<MomChange> {
    monthly
        .windows(2)
        .map(|pair| {
            let (previous, current) = (&pair[0], &pair[1]);
            let change = if previous.net != 0.0 {
                (current.net - previous.net) / previous.net.abs() * 100.0
            } else {
                0.0
            };
            MomChange {
                month: current.month.clone(),
                change,
                previous_value: previous.net,
                current_value: current.net,
            }
        })
        .collect()
}

fn histogram(entries: &[LedgerEntry]) -> Vec<HistogramBucket> {
    let mut buckets = vec![
        HistogramBucket::bracket("<€10", 0.0, Some(10.0)),
        HistogramBucket::bracket("€10-€50", 10.0, Some(50.0)),
        HistogramBucket::bracket("€50-€100", 50.0, Some(100.0)),
        HistogramBucket::bracket("€100-€200", 100.0, Some(200.0)),
        HistogramBucket::bracket("€200+", 200.0, None),
    ];

    for e in entries {
        if let Some(bucket) = buckets.iter_mut().find(|b| b.holds(e.amount)) {
            bucket.count += 1;
            match e.kind {
                Kind::Deposit => bucket.deposits += 1,
                Kind::Withdrawal => bucket.withdrawals += 1,
            }
        }
    }

    buckets.retain(|b| b.count > 0);
    buckets
}

/// Span between the first and last entry in days, spread over the gaps between entries.
fn avg_days_between(entries: &[LedgerEntry]) -> f64 {
    match (entries.first(), entries.last()) {
        (Some(first), Some(last)) if entries.len() > 1 => {
            let days = (last.at - first.at).num_milliseconds() as f64 / 86_400_000.0;
            days / (entries.len() - 1) as f64
        }
        _ => 0.0,
    }
}

fn moment(e: &LedgerEntry) -> BalanceMoment {
    BalanceMoment {
        date: e.date.clone(),
        balance: e.running_balance,
    }
}

fn mean_net(months: &[MonthBucket]) -> f64 {
    ratio(months.iter().map(|m| m.net).sum(), months.len() as f64)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator != 0.0 { numerator / denominator } else { 0.0 }
}

fn ratio_percent(part: f64, whole: f64) -> f64 {
    ratio(part, whole) * 100.0
}

/// Left-to-right fold keeping the first item with the greatest key.
pub(crate) fn first_max_by<T>(items: impl IntoIterator<Item = T>, key: impl Fn(&T) -> f64) -> Option<T> {
    items.into_iter().fold(None, |best, item| match best {
        Some(b) if key(&item) <= key(&b) => Some(b),
        _ => Some(item),
    })
}

/// Left-to-right fold keeping the first item with the smallest key.
pub(crate) fn first_min_by<T>(items: impl IntoIterator<Item = T>, key: impl Fn(&T) -> f64) -> Option<T> {
    items.into_iter().fold(None, |best, item| match best {
        Some(b) if key(&item) >= key(&b) => Some(b),
        _ => Some(item),
    })
}
