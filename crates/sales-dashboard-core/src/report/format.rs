use num_format::{Locale, ToFormattedString};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Rate};

/// Text shown when a KPI has no value.
pub const NOT_AVAILABLE: &str = "N/A";

/// `1234.5` -> `1,234.50`
pub fn format_grouped(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = rounded.abs();
    let whole = abs.trunc();
    let cents = ((abs - whole) * dec!(100)).to_u32().unwrap_or(0);
    format!(
        "{}{}.{:02}",
        sign,
        whole.to_u128().unwrap_or(0).to_formatted_string(&Locale::en),
        cents
    )
}

/// `1234.5` -> `$1,234.50`, `-3` -> `-$3.00`
pub fn format_money(value: Money) -> String {
    let grouped = format_grouped(value);
    match grouped.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", grouped),
    }
}

/// Decimal rate as a percentage: `0.1234` -> `12.34%`
pub fn format_rate(rate: Rate) -> String {
    format!("{:.2}%", (rate * dec!(100)).round_dp(2))
}

/// Hour of day as `14:00`, or `N/A`.
pub fn format_hour(hour: Option<u32>) -> String {
    match hour {
        Some(h) => format!("{}:00", h),
        None => NOT_AVAILABLE.to_string(),
    }
}
