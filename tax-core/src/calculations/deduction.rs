//! Deduction selection for the state/local and federal stages.
//!
//! Both stages choose between the standard deduction and the filer's
//! itemized amount, then add personal exemptions. The state stage only
//! counts dependents; the federal stage counts every exemption and applies
//! the year's phase-out rule.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{format_money, max};
use crate::models::{ExemptionPhaseout, LineItem, YearRates};

/// A resolved deduction and the taxable income it leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    /// Deduction plus exemptions.
    pub amount: Decimal,
    /// `max(income - amount, 0)`.
    pub taxable_income: Decimal,
    pub used_itemized: bool,
    /// Detail lines for the deductions section.
    pub lines: Vec<LineItem>,
}

/// Resolves deductions against one year's rates.
#[derive(Debug, Clone, Copy)]
pub struct DeductionResolver<'a> {
    rates: &'a YearRates,
}

impl<'a> DeductionResolver<'a> {
    pub fn new(rates: &'a YearRates) -> Self {
        Self { rates }
    }

    /// State and city deduction.
    ///
    /// Itemized deductions win only when they exceed the standard deduction,
    /// and are ignored entirely above the state's itemized income limit.
    pub fn state_local(
        &self,
        income: Decimal,
        itemized: Decimal,
        exemptions: u32,
    ) -> Deduction {
        let state = &self.rates.state;
        let mut lines = Vec::new();

        let considered = match state.itemized_income_limit {
            Some(limit) if income > limit => {
                debug!(
                    income = %income,
                    limit = %limit,
                    "Itemized deductions ignored above state limit"
                );
                Decimal::ZERO
            }
            _ => itemized,
        };

        let used_itemized = considered > state.standard_deduction;
        let base = if used_itemized {
            lines.push(LineItem::detail(format!(
                "Itemized Deductions = {}",
                format_money(considered)
            )));
            considered
        } else {
            lines.push(LineItem::detail(format!(
                "{} Standard Deduction = {}",
                state.name,
                format_money(state.standard_deduction)
            )));
            state.standard_deduction
        };

        let dependents = exemptions.saturating_sub(1);
        let dependent_exemptions = state.dependent_exemption * Decimal::from(dependents);
        if dependents > 0 {
            lines.push(LineItem::detail(format!(
                "Personal exemptions for dependents = {}  ({} x {})",
                format_money(dependent_exemptions),
                dependents,
                format_money(state.dependent_exemption)
            )));
        }

        Self::resolved(income, base + dependent_exemptions, used_itemized, lines)
    }

    /// Federal deduction.
    ///
    /// State and local tax counts as an itemized deduction, so the federal
    /// stage runs after the state and city taxes are known.
    pub fn federal(
        &self,
        income: Decimal,
        itemized: Decimal,
        state_local_tax: Decimal,
        exemptions: u32,
    ) -> Deduction {
        let federal = &self.rates.federal;
        let mut lines = Vec::new();

        let candidate = itemized + state_local_tax;
        let used_itemized = candidate >= federal.standard_deduction;
        let base = if used_itemized {
            lines.push(LineItem::detail(format!(
                "State and Local Taxes Deduction = {}",
                format_money(state_local_tax)
            )));
            lines.push(LineItem::detail(format!(
                "Additional Itemized Deductions = {}",
                format_money(itemized)
            )));
            candidate
        } else {
            lines.push(LineItem::detail(format!(
                "Federal Standard Deduction = {}",
                format_money(federal.standard_deduction)
            )));
            federal.standard_deduction
        };

        let personal_exemptions = if federal.exemption_phaseout.allows(income) {
            let total = federal.personal_exemption * Decimal::from(exemptions);
            lines.push(LineItem::detail(format!(
                "Personal Exemptions = {}  ({} x {})",
                format_money(total),
                exemptions,
                format_money(federal.personal_exemption)
            )));
            total
        } else {
            if let ExemptionPhaseout::ZeroAbove { threshold } = federal.exemption_phaseout {
                debug!(
                    income = %income,
                    threshold = %threshold,
                    "Personal exemptions phased out"
                );
                lines.push(LineItem::detail(format!(
                    "Personal Exemptions = {}  (phased out above {})",
                    format_money(Decimal::ZERO),
                    format_money(threshold)
                )));
            }
            Decimal::ZERO
        };

        Self::resolved(income, base + personal_exemptions, used_itemized, lines)
    }

    fn resolved(
        income: Decimal,
        amount: Decimal,
        used_itemized: bool,
        lines: Vec<LineItem>,
    ) -> Deduction {
        Deduction {
            amount,
            taxable_income: max(income - amount, Decimal::ZERO),
            used_itemized,
            lines,
        }
    }
}
