//! tally-analytics: statistics engine, insight rules, profile comparison and display formatting

pub mod compare;
pub mod format;
pub mod insights;
pub mod stats;

pub use compare::{Comparison, MetricRow, MonthPair, Side, compare_profiles};
pub use format::{format_currency, format_percent, month_label};
pub use insights::{Insight, InsightCategory, InsightLevel, Rule, TrendArrow, generate_insights};
pub use stats::{
    BalanceMoment, DistributionSlice, HistogramBucket, LargestTransaction, MomChange, MonthBucket,
    MostActiveMonth, Statistics, Trend, compute_statistics,
};
