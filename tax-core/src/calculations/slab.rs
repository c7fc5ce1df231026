//! Progressive ("slab") tax over a bracket schedule.
//!
//! Taxable income is cut into consecutive slabs, one per bracket it reaches.
//! Each slab is taxed at its bracket's rate and the slab taxes are summed.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::compute_slab_tax;
//! use tax_core::{Bracket, BracketSchedule};
//!
//! let schedule = BracketSchedule::new(vec![
//!     Bracket::bounded(dec!(9075), dec!(10)),
//!     Bracket::bounded(dec!(36900), dec!(15)),
//!     Bracket::unbounded(dec!(25)),
//! ])
//! .unwrap();
//!
//! let result = compute_slab_tax(dec!(39850), &schedule);
//!
//! assert_eq!(result.tax, dec!(5818.75));
//! assert_eq!(result.slabs.len(), 3);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{format_money, format_rate, percent_of};
use crate::models::{BracketSchedule, LineItem};

/// The portion of taxable income that falls inside one bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slab {
    pub from: Decimal,
    pub to: Decimal,
    pub rate: Decimal,
    /// `to - from`.
    pub amount: Decimal,
    pub tax: Decimal,
}

impl Slab {
    /// Breakdown line, e.g. `Slab from $0.00 to $9,075.00 = $907.50 (at 10% on $9,075.00)`.
    pub fn line_item(&self) -> LineItem {
        LineItem::detail(format!(
            "Slab from {} to {} = {} (at {} on {})",
            format_money(self.from),
            format_money(self.to),
            format_money(self.tax),
            format_rate(self.rate),
            format_money(self.amount),
        ))
    }
}

/// Result of applying a schedule to one taxable income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabTax {
    pub tax: Decimal,
    /// Slabs in ascending order; their amounts sum to the taxable income.
    pub slabs: Vec<Slab>,
}

impl SlabTax {
    pub fn line_items(&self) -> impl Iterator<Item = LineItem> + '_ {
        self.slabs.iter().map(Slab::line_item)
    }
}

/// Applies `schedule` to `taxable_income`.
///
/// Brackets above the income are never visited. Zero income yields one
/// zero-amount slab. Negative income is logged and treated as zero.
pub fn compute_slab_tax(
    taxable_income: Decimal,
    schedule: &BracketSchedule,
) -> SlabTax {
    let taxable_income = if taxable_income < Decimal::ZERO {
        warn!(
            taxable_income = %taxable_income,
            "Negative taxable income passed to slab calculation; using zero"
        );
        Decimal::ZERO
    } else {
        taxable_income
    };

    let slabs: Vec<Slab> = schedule
        .brackets()
        .iter()
        .scan(Some(Decimal::ZERO), |lower, bracket| {
            let from = (*lower)?;
            let to = bracket
                .upper_bound
                .map_or(taxable_income, |bound| bound.min(taxable_income));

            // Continue only while income reaches past this bracket.
            *lower = match bracket.upper_bound {
                Some(bound) if taxable_income > bound => Some(bound),
                _ => None,
            };

            let amount = to - from;
            Some(Slab {
                from,
                to,
                rate: bracket.rate,
                amount,
                tax: percent_of(amount, bracket.rate),
            })
        })
        .collect();

    let tax = slabs.iter().map(|slab| slab.tax).sum();

    SlabTax { tax, slabs }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;
    use crate::models::tax_year_config::fixtures::nyc_2014;

    /// Initializes tracing subscriber for tests that verify log output.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    // =========================================================================
    // compute_slab_tax tests
    // =========================================================================

    #[test]
    fn federal_2014_scenario_matches_hand_computation() {
        let rates = nyc_2014();

        let result = compute_slab_tax(dec!(39850), &rates.federal.brackets);

        assert_eq!(
            result.slabs.iter().map(|s| s.tax).collect::<Vec<_>>(),
            vec![dec!(907.5), dec!(4173.75), dec!(737.5)]
        );
        assert_eq!(result.tax, dec!(5818.75));
    }

    #[test]
    fn state_2014_scenario_matches_hand_computation() {
        let rates = nyc_2014();

        let result = compute_slab_tax(dec!(42200), &rates.state.brackets);

        assert_eq!(result.slabs.len(), 5);
        assert_eq!(result.tax, dec!(2396.35));
    }

    #[test]
    fn city_2014_scenario_matches_hand_computation() {
        let rates = nyc_2014();

        let result = compute_slab_tax(dec!(42200), &rates.city.brackets);

        assert_eq!(result.tax, dec!(1425.912));
    }

    #[test]
    fn income_on_a_bound_stops_at_that_bracket() {
        let rates = nyc_2014();

        let result = compute_slab_tax(dec!(9075), &rates.federal.brackets);

        assert_eq!(result.slabs.len(), 1);
        assert_eq!(result.tax, dec!(907.5));
    }

    #[test]
    fn income_above_top_bound_uses_unbounded_bracket() {
        let rates = nyc_2014();

        let result = compute_slab_tax(dec!(500000), &rates.federal.brackets);

        let last = result.slabs.last().unwrap();
        assert_eq!(result.slabs.len(), 7);
        assert_eq!(last.from, dec!(406750));
        assert_eq!(last.to, dec!(500000));
        assert_eq!(last.rate, dec!(39.6));
    }

    #[test]
    fn zero_income_yields_single_empty_slab() {
        let rates = nyc_2014();

        let result = compute_slab_tax(dec!(0), &rates.federal.brackets);

        assert_eq!(
            result.slabs,
            vec![Slab {
                from: dec!(0),
                to: dec!(0),
                rate: dec!(10),
                amount: dec!(0),
                tax: dec!(0),
            }]
        );
        assert_eq!(result.tax, dec!(0));
    }

    #[test]
    fn negative_income_is_treated_as_zero() {
        let _guard = init_test_tracing();
        let rates = nyc_2014();

        let result = compute_slab_tax(dec!(-500), &rates.federal.brackets);

        assert_eq!(result.tax, dec!(0));
        assert_eq!(result.slabs.len(), 1);
        assert_eq!(result.slabs[0].amount, dec!(0));
    }

    #[test]
    fn slab_amounts_sum_to_taxable_income() {
        let rates = nyc_2014();
        let schedules = [
            &rates.federal.brackets,
            &rates.state.brackets,
            &rates.city.brackets,
        ];

        for schedule in schedules {
            for step in 0..=240 {
                let income = Decimal::from(step * 5_000) + dec!(0.37);

                let result = compute_slab_tax(income, schedule);

                let total: Decimal = result.slabs.iter().map(|s| s.amount).sum();
                assert_eq!(total, income, "slab amounts at income {income}");
            }
        }
    }

    #[test]
    fn slabs_are_contiguous() {
        let rates = nyc_2014();

        let result = compute_slab_tax(dec!(300000), &rates.federal.brackets);

        for pair in result.slabs.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
    }

    #[test]
    fn tax_is_monotonic_in_income() {
        let rates = nyc_2014();
        let mut previous = Decimal::ZERO;

        for step in 0..=500 {
            let income = Decimal::from(step * 2_500);

            let tax = compute_slab_tax(income, &rates.state.brackets).tax;

            assert!(tax >= previous, "tax fell at income {income}");
            previous = tax;
        }
    }

    // =========================================================================
    // line_item tests
    // =========================================================================

    #[test]
    fn slab_line_describes_range_rate_and_tax() {
        let slab = Slab {
            from: dec!(0),
            to: dec!(9075),
            rate: dec!(10),
            amount: dec!(9075),
            tax: dec!(907.5),
        };

        assert_eq!(
            slab.line_item(),
            LineItem::detail("Slab from $0.00 to $9,075.00 = $907.50 (at 10% on $9,075.00)")
        );
    }

    #[test]
    fn slab_line_keeps_fractional_rates() {
        let rates = nyc_2014();

        let result = compute_slab_tax(dec!(12000), &rates.city.brackets);
        let lines: Vec<LineItem> = result.line_items().collect();

        assert_eq!(
            lines,
            vec![LineItem::detail(
                "Slab from $0.00 to $12,000.00 = $348.84 (at 2.907% on $12,000.00)"
            )]
        );
    }
}
