//! The full single-filer pipeline.
//!
//! State and city taxes are assessed first because they feed the federal
//! itemized deduction. The federal stage compares regular tax against the
//! AMT, adds FICA, and the pipeline closes with after-tax figures.
//!
//! # Emission order
//!
//! | Step | Lines |
//! |------|-------|
//! | 1    | Adjusted gross income |
//! | 2    | State deductions section, state taxable income |
//! | 3    | State income tax section |
//! | 4    | City income tax section (with school tax credit) |
//! | 5    | State and city total |
//! | 6    | Federal deductions section, federal taxable income |
//! | 7    | Federal income tax section |
//! | 8    | AMT note |
//! | 9    | FICA section |
//! | 10   | Federal total, grand total |
//! | 11   | After-tax income, effective rate, monthly income |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::amt::{Amt, compute_amt};
use crate::calculations::common::{format_money, max};
use crate::calculations::deduction::{Deduction, DeductionResolver};
use crate::calculations::fica::{Fica, compute_fica};
use crate::calculations::slab::{SlabTax, compute_slab_tax};
use crate::models::{Amount, FilerInput, LineItem, TaxReport, YearRates};
use crate::reporting::{NoopReporter, Reporter};

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Every figure produced by one pass of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub income: Decimal,
    pub itemized_deductions: Decimal,
    pub exemptions: u32,

    pub state_deduction: Deduction,
    pub state_tax: SlabTax,
    /// City tax before the school tax credit.
    pub city_slab_tax: SlabTax,
    /// Credit actually applied; never more than the city tax.
    pub school_tax_credit: Decimal,
    pub city_tax: Decimal,
    pub state_local_total: Decimal,

    pub federal_deduction: Deduction,
    pub federal_income_tax: SlabTax,
    /// `None` when the year has no AMT.
    pub amt: Option<Amt>,
    /// Larger of regular federal tax and AMT.
    pub federal_tax: Decimal,
    pub fica: Fica,
    pub total_federal: Decimal,

    pub total_tax: Decimal,
    pub after_tax_income: Decimal,
    /// Percentage; zero when income is zero.
    pub effective_rate: Decimal,
    pub monthly_income: Decimal,

    /// Report lines in emission order.
    pub lines: Vec<LineItem>,
}

/// Runs the pipeline against one year's rates.
#[derive(Debug, Clone, Copy)]
pub struct TaxAggregator<'a> {
    rates: &'a YearRates,
}

impl<'a> TaxAggregator<'a> {
    pub fn new(rates: &'a YearRates) -> Self {
        Self { rates }
    }

    /// Evaluates the pipeline once without emitting anything.
    pub fn assess(
        &self,
        income: Decimal,
        itemized_deductions: Decimal,
        exemptions: u32,
    ) -> Assessment {
        let rates = self.rates;
        let deductions = DeductionResolver::new(rates);
        let mut lines = vec![LineItem::money("Adjusted Gross Income", income)];

        // State and city
        let state_deduction = deductions.state_local(income, itemized_deductions, exemptions);
        let state_taxable = state_deduction.taxable_income;
        section(
            &mut lines,
            format!("{} Tax Deductions", rates.state.name),
            state_deduction.lines.iter().cloned(),
            state_deduction.amount,
        );
        lines.push(LineItem::money(
            format!("{} Taxable Income", rates.state.name),
            state_taxable,
        ));

        let state_tax = compute_slab_tax(state_taxable, &rates.state.brackets);
        section(
            &mut lines,
            format!("{} Income Tax", rates.state.name),
            state_tax.line_items(),
            state_tax.tax,
        );

        let city_slab_tax = compute_slab_tax(state_taxable, &rates.city.brackets);
        let (school_tax_credit, city_tax) = self.apply_school_tax_credit(city_slab_tax.tax);
        let credit_line = rates.city.school_tax_credit.map(|credit| {
            LineItem::detail(format!(
                "minus the {} School Tax Credit of {}",
                rates.city.name,
                format_money(credit)
            ))
        });
        section(
            &mut lines,
            format!("{} Income Tax", rates.city.name),
            city_slab_tax.line_items().chain(credit_line),
            city_tax,
        );

        let state_local_total = state_tax.tax + city_tax;
        lines.push(LineItem::money(
            format!(
                "Total {} & {} Taxes",
                rates.state.name,
                rates.city.display_short_name()
            ),
            state_local_total,
        ));
        debug!(
            state_taxable = %state_taxable,
            state_tax = %state_tax.tax,
            city_tax = %city_tax,
            "State and city taxes assessed"
        );

        // Federal
        let federal_deduction =
            deductions.federal(income, itemized_deductions, state_local_total, exemptions);
        let federal_taxable = federal_deduction.taxable_income;
        section(
            &mut lines,
            "Federal Tax Deductions".to_string(),
            federal_deduction.lines.iter().cloned(),
            federal_deduction.amount,
        );
        lines.push(LineItem::money("Federal Taxable Income", federal_taxable));

        let federal_income_tax = compute_slab_tax(federal_taxable, &rates.federal.brackets);
        section(
            &mut lines,
            "Federal Income Tax".to_string(),
            federal_income_tax.line_items(),
            federal_income_tax.tax,
        );

        let amt = rates
            .federal
            .amt
            .as_ref()
            .map(|amt_rates| compute_amt(income, amt_rates));
        if let Some(amt) = &amt {
            lines.push(amt.line_item());
        }
        let federal_tax = amt.map_or(federal_income_tax.tax, |amt| {
            max(federal_income_tax.tax, amt.amount)
        });

        let fica = compute_fica(income, &rates.federal.fica);
        section(
            &mut lines,
            "Federal Insurance Contributions Act (FICA) Tax".to_string(),
            fica.line_items(),
            fica.total,
        );

        let total_federal = federal_tax + fica.total;
        lines.push(LineItem::money("Total Federal Taxes", total_federal));
        debug!(
            federal_taxable = %federal_taxable,
            federal_tax = %federal_tax,
            fica = %fica.total,
            "Federal taxes assessed"
        );

        // Totals
        let total_tax = total_federal + state_local_total;
        lines.push(LineItem::money("Total Federal, State & Local Taxes", total_tax));

        let after_tax_income = income - total_tax;
        let effective_rate = effective_rate(total_tax, income);
        let monthly_income = after_tax_income / MONTHS_PER_YEAR;
        lines.push(LineItem::money("Income after Taxation", after_tax_income));
        lines.push(LineItem::aggregate(
            "Effective Tax Rate",
            Amount::Percent(effective_rate),
        ));
        lines.push(LineItem::money("Monthly Income", monthly_income));

        if itemized_deductions > Decimal::ZERO {
            let after_spending = after_tax_income - itemized_deductions;
            lines.push(LineItem::money(
                "Income after Taxes & Deductible Spending",
                after_spending,
            ));
            lines.push(LineItem::money(
                "Monthly Income after Taxes & Deductible Spending",
                after_spending / MONTHS_PER_YEAR,
            ));
        }

        Assessment {
            income,
            itemized_deductions,
            exemptions,
            state_deduction,
            state_tax,
            city_slab_tax,
            school_tax_credit,
            city_tax,
            state_local_total,
            federal_deduction,
            federal_income_tax,
            amt,
            federal_tax,
            fica,
            total_federal,
            total_tax,
            after_tax_income,
            effective_rate,
            monthly_income,
            lines,
        }
    }

    /// Assesses and emits every line to `reporter`, returning the total tax.
    pub fn calculate_taxes(
        &self,
        income: Decimal,
        itemized_deductions: Decimal,
        exemptions: u32,
        reporter: &mut dyn Reporter,
    ) -> Decimal {
        let assessment = self.assess(income, itemized_deductions, exemptions);
        for line in assessment.lines {
            reporter.report(line);
        }
        assessment.total_tax
    }

    /// Tax on the next dollar, as a percentage.
    pub fn marginal_rate(
        &self,
        income: Decimal,
        itemized_deductions: Decimal,
        exemptions: u32,
    ) -> Decimal {
        let (base, next) = rayon::join(
            || self.silent_total(income, itemized_deductions, exemptions),
            || self.silent_total(income + Decimal::ONE, itemized_deductions, exemptions),
        );
        (next - base) * Decimal::ONE_HUNDRED
    }

    /// Full report for validated input, closing with the marginal rate.
    pub fn report(
        &self,
        input: &FilerInput,
    ) -> TaxReport {
        let (assessment, next_total) = rayon::join(
            || self.assess(input.income, input.itemized_deductions, input.exemptions),
            || {
                self.silent_total(
                    input.income + Decimal::ONE,
                    input.itemized_deductions,
                    input.exemptions,
                )
            },
        );

        let marginal_rate = (next_total - assessment.total_tax) * Decimal::ONE_HUNDRED;
        let mut lines = assessment.lines;
        lines.push(LineItem::aggregate(
            "Marginal Tax Rate",
            Amount::Percent(marginal_rate),
        ));

        TaxReport {
            lines,
            total_tax: assessment.total_tax,
            after_tax_income: assessment.after_tax_income,
            effective_rate: assessment.effective_rate,
            monthly_income: assessment.monthly_income,
            marginal_rate,
        }
    }

    fn silent_total(
        &self,
        income: Decimal,
        itemized_deductions: Decimal,
        exemptions: u32,
    ) -> Decimal {
        self.calculate_taxes(income, itemized_deductions, exemptions, &mut NoopReporter)
    }

    /// Returns `(credit applied, city tax after credit)`.
    fn apply_school_tax_credit(
        &self,
        city_tax: Decimal,
    ) -> (Decimal, Decimal) {
        let Some(credit) = self.rates.city.school_tax_credit else {
            return (Decimal::ZERO, city_tax);
        };

        if credit > city_tax {
            warn!(
                credit = %credit,
                city_tax = %city_tax,
                "School tax credit exceeds city tax; city tax floored at zero"
            );
            return (city_tax, Decimal::ZERO);
        }

        (credit, city_tax - credit)
    }
}

/// Engine entry point: emits the full breakdown and returns the total tax.
pub fn calculate_taxes(
    rates: &YearRates,
    income: Decimal,
    itemized_deductions: Decimal,
    exemptions: u32,
    reporter: &mut dyn Reporter,
) -> Decimal {
    TaxAggregator::new(rates).calculate_taxes(income, itemized_deductions, exemptions, reporter)
}

fn section(
    lines: &mut Vec<LineItem>,
    label: String,
    details: impl IntoIterator<Item = LineItem>,
    total: Decimal,
) {
    lines.push(LineItem::section_start(label.clone()));
    lines.extend(details);
    lines.push(LineItem::section_end(label, total));
}

fn effective_rate(
    total_tax: Decimal,
    income: Decimal,
) -> Decimal {
    if income.is_zero() {
        return Decimal::ZERO;
    }
    total_tax * Decimal::ONE_HUNDRED / income
}
