//! Common utility functions for tax calculations.
//!
//! Shared arithmetic and formatting used by every calculator and by the
//! report lines they produce.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero). Only used for display; the
/// engine itself carries full precision.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Applies a percentage rate (`6.2` meaning 6.2%) to an amount.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(50000), dec!(6.2)), dec!(3100));
/// ```
pub fn percent_of(
    amount: Decimal,
    rate: Decimal,
) -> Decimal {
    amount * rate / Decimal::ONE_HUNDRED
}

/// Formats money as `$1,234.56`, negatives as `-$62.50`.
pub fn format_money(value: Decimal) -> String {
    let mut rounded = round_half_up(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded.set_sign_positive(true);
    rounded.rescale(2);

    let digits = rounded.to_string();
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let grouped = group_thousands(whole);

    if negative {
        format!("-${grouped}.{cents}")
    } else {
        format!("${grouped}.{cents}")
    }
}

/// Formats a percentage figure with two decimals, e.g. `26.81%`.
pub fn format_percent(value: Decimal) -> String {
    let mut rounded = round_half_up(value);
    rounded.rescale(2);
    format!("{rounded}%")
}

/// Formats a bracket rate without trailing zeros, e.g. `39.6%` or `4%`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}

fn group_thousands(whole: &str) -> String {
    let len = whole.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
