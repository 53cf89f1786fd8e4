//! Plain-text rendering shared by the report binaries.

use sf_core::Amount;
use sf_core::Timestamp;

/// `1234567.5` -> `1,234,567.50`; whole amounts drop the decimals.
pub fn format_amount(amount: Amount) -> String {
    let cents = (amount * 100.0).round() as i64;
    let negative = cents < 0;
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = cents % 100;
    let sign = if negative { "-" } else { "" };
    if frac == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac:02}")
    }
}

pub fn format_day(at: Option<Timestamp>) -> String {
    at.map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Pad or cut `text` to exactly `width` characters.
pub fn cell(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    } else {
        format!("{text}{}", " ".repeat(width - count))
    }
}
