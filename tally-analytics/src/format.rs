//! Display helpers shared by insight text and reports

use chrono::NaiveDate;

/// `1234.5` -> `€1,234.50`, `-20` -> `-€20.00`
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc() as u64;
    let frac = (cents % 100.0) as u64;
    let sign = if value < 0.0 && cents > 0.0 { "-" } else { "" };
    format!("{sign}€{}.{frac:02}", group_thousands(whole))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Signed percentage: `20.0` -> `+20.0%`, `-3.26` with one decimal -> `-3.3%`.
/// Values that round to zero carry no sign.
pub fn format_percent(value: f64, decimals: usize) -> String {
    let magnitude = format!("{:.*}", decimals, value.abs());
    let is_zero = magnitude.parse::<f64>().map(|v| v == 0.0).unwrap_or(true);
    let sign = if is_zero {
        ""
    } else if value > 0.0 {
        "+"
    } else {
        "-"
    };
    format!("{sign}{magnitude}%")
}

/// `2024-01` -> `January 2024`. Unrecognized keys are returned unchanged.
pub fn month_label(month_key: &str) -> String {
    NaiveDate::parse_from_str(&format!("{month_key}-01"), "%Y-%m-%d")
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|_| month_key.to_string())
}
