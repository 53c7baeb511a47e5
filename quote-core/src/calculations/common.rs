//! Rounding and display helpers shared by the estimate formatter.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to a whole currency unit, halves away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use quote_core::calculations::common::round_whole;
///
/// assert_eq!(round_whole(dec!(431.49)), dec!(431));
/// assert_eq!(round_whole(dec!(431.50)), dec!(432));
/// assert_eq!(round_whole(dec!(-12.5)), dec!(-13));
/// ```
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount as whole dollars with thousands separators (`$1,234`).
///
/// The value is rounded with [`round_whole`] first; callers must pass the
/// unrounded amount.
pub fn format_currency(value: Decimal) -> String {
    let rounded = round_whole(value);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Formats an hour count as `"N hours"`.
pub fn format_hours(hours: Decimal) -> String {
    format!("{} hours", hours.normalize())
}
