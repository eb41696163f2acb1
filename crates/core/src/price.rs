//! Currency formatting for listing and detail pages.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format a price as dollars with thousands separators and two decimals,
/// e.g. `1234.5` becomes `$1,234.50`.
pub fn format_price(price: &Decimal) -> String {
    let rounded = price
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{rounded:.2}");
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if price.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}
