//! Simplified alternative minimum tax.
//!
//! The exemption is lost in one step at the phase-out threshold and the rate
//! is one of two flat rates. The result is a floor under the regular federal
//! income tax.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{format_money, format_rate, max, percent_of};
use crate::models::{AmtRates, LineItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amt {
    pub exemption: Decimal,
    pub taxable: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
}

impl Amt {
    pub fn line_item(&self) -> LineItem {
        LineItem::text(format!(
            "Minimum Federal Income Tax: {} (at {} on {})",
            format_money(self.amount),
            format_rate(self.rate),
            format_money(self.taxable)
        ))
    }
}

/// Computes the AMT on gross income.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::AmtRates;
/// use tax_core::calculations::compute_amt;
///
/// let rates = AmtRates {
///     exemption_amount: dec!(52800),
///     exemption_phaseout_threshold: dec!(115400),
///     low_rate: dec!(26),
///     high_rate: dec!(28),
///     high_rate_threshold: dec!(179500),
/// };
///
/// assert_eq!(compute_amt(dec!(100000), &rates).amount, dec!(12272));
/// ```
pub fn compute_amt(
    income: Decimal,
    rates: &AmtRates,
) -> Amt {
    let exemption = if income < rates.exemption_phaseout_threshold {
        rates.exemption_amount
    } else {
        Decimal::ZERO
    };

    let taxable = max(income - exemption, Decimal::ZERO);

    let rate = if income <= rates.high_rate_threshold {
        rates.low_rate
    } else {
        rates.high_rate
    };

    Amt {
        exemption,
        taxable,
        rate,
        amount: percent_of(taxable, rate),
    }
}
