//! Plain-text rendering of ledgers, statistics and comparisons.

use std::fmt::Write;

use tally_analytics::{
    Comparison, Insight, Side, Statistics, format_currency, format_percent, month_label,
};
use tally_core::LedgerEntry;

pub struct Style<'a> {
    pub currency_symbol: &'a str,
    /// 0 = unlimited
    pub insight_limit: usize,
}

impl Style<'_> {
    fn money(&self, v: f64) -> String {
        format_currency(v).replace('€', self.currency_symbol)
    }
}

pub fn render_ledger(entries: &[LedgerEntry], limit: Option<usize>, style: &Style) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<12} {:<11} {:>14} {:>16}", "Date", "Type", "Value", "Balance");
    let shown = limit.unwrap_or(entries.len());
    for e in entries.iter().take(shown) {
        let _ = writeln!(
            out,
            "{:<12} {:<11} {:>14} {:>16}",
            e.date,
            e.kind,
            style.money(e.amount),
            style.money(e.running_balance)
        );
    }
    if entries.len() > shown {
        let _ = writeln!(out, "... {} more", entries.len() - shown);
    }
    out
}

pub fn render_statistics(stats: &Statistics, style: &Style) -> String {
    let mut out = String::new();
    let count = stats.deposit_count + stats.withdrawal_count;
    if count == 0 {
        out.push_str("No transactions in this view.\n");
        return out;
    }

    let _ = writeln!(out, "## Summary\n");
    let _ = writeln!(out, "Net result        {}", style.money(stats.net_result));
    let _ = writeln!(
        out,
        "Deposited         {} ({} deposits, avg {}, max {})",
        style.money(stats.total_deposited),
        stats.deposit_count,
        style.money(stats.avg_deposit),
        style.money(stats.max_deposit)
    );
    let _ = writeln!(
        out,
        "Withdrawn         {} ({} withdrawals, avg {}, max {})",
        style.money(stats.total_withdrawn),
        stats.withdrawal_count,
        style.money(stats.avg_withdrawal),
        style.money(stats.max_withdrawal)
    );
    let _ = writeln!(out, "ROI               {}", format_percent(stats.roi, 1));
    let _ = writeln!(
        out,
        "Win rate          {:.0}% ({} of {} months profitable)",
        stats.win_rate,
        stats.profitable_months,
        stats.monthly.len()
    );
    let _ = writeln!(
        out,
        "Trend             {:?} ({})",
        stats.trend,
        format_percent(stats.trend_value, 1)
    );
    if count > 1 {
        let _ = writeln!(
            out,
            "Cadence           one transaction every {:.1} days",
            stats.avg_days_between_transactions
        );
    }
    if let Some(peak) = &stats.peak_moment {
        let _ = writeln!(out, "Peak balance      {} on {}", style.money(peak.balance), peak.date);
    }
    if let Some(valley) = &stats.valley_moment {
        let _ = writeln!(
            out,
            "Lowest balance    {} on {}",
            style.money(valley.balance),
            valley.date
        );
    }

    let _ = writeln!(out, "\n## Months\n");
    for (i, m) in stats.monthly.iter().enumerate() {
        // mom_changes[i - 1] describes month i
        let change = i
            .checked_sub(1)
            .and_then(|j| stats.mom_changes.get(j))
            .map(|c| format_percent(c.change, 1))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<16} {:>14} {:>10}",
            month_label(&m.month),
            style.money(m.net),
            change
        );
    }
    if let (Some(best), Some(worst)) = (&stats.best_month, &stats.worst_month) {
        let _ = writeln!(
            out,
            "\nBest: {} ({})   Worst: {} ({})",
            month_label(&best.month),
            style.money(best.net),
            month_label(&worst.month),
            style.money(worst.net)
        );
    }

    let _ = writeln!(out, "\n## Amounts\n");
    for b in &stats.histogram {
        let range = b.range.replace('€', style.currency_symbol);
        let _ = writeln!(
            out,
            "{:<12} {:>4}  ({} deposits, {} withdrawals)",
            range, b.count, b.deposits, b.withdrawals
        );
    }

    if !stats.insights.is_empty() {
        let _ = writeln!(out, "\n## Insights\n");
        let limit = match style.insight_limit {
            0 => stats.insights.len(),
            n => n,
        };
        for insight in stats.insights.iter().take(limit) {
            out.push_str(&render_insight(insight, style));
        }
    }
    out
}

fn render_insight(insight: &Insight, style: &Style) -> String {
    let level = format!("{:?}", insight.level).to_uppercase();
    let mut line = format!("[{level}] {}", insight.title);
    if let Some(value) = &insight.value {
        let _ = write!(line, ": {value}");
    }
    let _ = write!(line, "\n        {}\n", insight.description);
    line.replace('€', style.currency_symbol)
}

pub fn render_comparison(a_name: &str, b_name: &str, cmp: &Comparison, style: &Style) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:>14} {:>14} {:>14}",
        "Metric", a_name, b_name, "Difference"
    );
    for row in &cmp.metrics {
        let (a, b, diff) = match row.metric.as_str() {
            "ROI" | "Win rate" => (
                format!("{:.1}%", row.a),
                format!("{:.1}%", row.b),
                format_percent(row.difference, 1),
            ),
            "Transactions" => (
                format!("{}", row.a),
                format!("{}", row.b),
                format!("{:+}", row.difference),
            ),
            _ => (
                style.money(row.a),
                style.money(row.b),
                style.money(row.difference),
            ),
        };
        let marker = match row.better {
            Side::A => "<",
            Side::B => ">",
            Side::Tie => "=",
        };
        let _ = writeln!(out, "{:<20} {:>14} {:>14} {:>14} {marker}", row.metric, a, b, diff);
    }

    let _ = writeln!(out, "\n{:<16} {:>14} {:>14}", "Month", a_name, b_name);
    for m in &cmp.monthly {
        let _ = writeln!(
            out,
            "{:<16} {:>14} {:>14}",
            month_label(&m.month),
            style.money(m.a),
            style.money(m.b)
        );
    }

    let verdict = match cmp.overall {
        Side::A => format!("{a_name} leads overall"),
        Side::B => format!("{b_name} leads overall"),
        Side::Tie => "Even overall".to_string(),
    };
    let _ = writeln!(out, "\n{verdict}");
    out
}
