//! Payroll (FICA) taxes on gross wages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{format_money, format_rate, percent_of};
use crate::models::{FicaRates, LineItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fica {
    /// Income subject to social security, capped at the wage base.
    pub social_security_taxable: Decimal,
    pub social_security_rate: Decimal,
    pub social_security_tax: Decimal,
    pub medicare_taxable: Decimal,
    pub medicare_rate: Decimal,
    pub medicare_tax: Decimal,
    pub total: Decimal,
}

impl Fica {
    pub fn line_items(&self) -> [LineItem; 2] {
        [
            LineItem::detail(format!(
                "Social Security's Old-Age, Survivors, and Disability Insurance (OASDI) Tax: {} (at {} flat on {})",
                format_money(self.social_security_tax),
                format_rate(self.social_security_rate),
                format_money(self.social_security_taxable)
            )),
            LineItem::detail(format!(
                "Medicare's Hospital Insurance (HI) Tax: {} (at {} flat on {})",
                format_money(self.medicare_tax),
                format_rate(self.medicare_rate),
                format_money(self.medicare_taxable)
            )),
        ]
    }
}

/// Social security up to the wage base plus uncapped medicare.
pub fn compute_fica(
    income: Decimal,
    rates: &FicaRates,
) -> Fica {
    let social_security_taxable = income.min(rates.social_security_wage_base);
    let social_security_tax = percent_of(social_security_taxable, rates.social_security_rate);
    let medicare_tax = percent_of(income, rates.medicare_rate);

    Fica {
        social_security_taxable,
        social_security_rate: rates.social_security_rate,
        social_security_tax,
        medicare_taxable: income,
        medicare_rate: rates.medicare_rate,
        medicare_tax,
        total: social_security_tax + medicare_tax,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn test_rates() -> FicaRates {
        FicaRates {
            social_security_rate: dec!(6.2),
            social_security_wage_base: dec!(117000),
            medicare_rate: dec!(1.45),
        }
    }

    // =========================================================================
    // compute_fica tests
    // =========================================================================

    #[test]
    fn below_wage_base_taxes_all_income() {
        let result = compute_fica(dec!(50000), &test_rates());

        assert_eq!(result.social_security_tax, dec!(3100));
        assert_eq!(result.medicare_tax, dec!(725));
        assert_eq!(result.total, dec!(3825));
    }

    #[test]
    fn social_security_caps_at_wage_base() {
        let result = compute_fica(dec!(200000), &test_rates());

        assert_eq!(result.social_security_taxable, dec!(117000));
        assert_eq!(result.social_security_tax, dec!(7254));
        assert_eq!(result.medicare_tax, dec!(2900));
        assert_eq!(result.total, dec!(10154));
    }

    #[test]
    fn exactly_at_wage_base() {
        let result = compute_fica(dec!(117000), &test_rates());

        assert_eq!(result.social_security_taxable, dec!(117000));
        assert_eq!(result.social_security_tax, dec!(7254));
    }

    #[test]
    fn zero_income_owes_nothing() {
        let result = compute_fica(dec!(0), &test_rates());

        assert_eq!(result.total, dec!(0));
    }

    // =========================================================================
    // line_items tests
    // =========================================================================

    #[test]
    fn line_items_show_rate_and_base() {
        let result = compute_fica(dec!(200000), &test_rates());

        assert_eq!(
            result.line_items(),
            [
                LineItem::detail(
                    "Social Security's Old-Age, Survivors, and Disability Insurance (OASDI) Tax: $7,254.00 (at 6.2% flat on $117,000.00)"
                ),
                LineItem::detail(
                    "Medicare's Hospital Insurance (HI) Tax: $2,900.00 (at 1.45% flat on $200,000.00)"
                ),
            ]
        );
    }
}
