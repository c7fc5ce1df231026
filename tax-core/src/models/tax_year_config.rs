use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tax_bracket::BracketSchedule;

/// Errors raised by [`YearRates::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateTableError {
    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("{field} must be a percentage in [0, 100), got {value}")]
    RateOutOfRange { field: &'static str, value: Decimal },
}

/// Rule for removing the federal personal exemption at high incomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ExemptionPhaseout {
    /// The full exemption always applies.
    #[default]
    Full,
    /// The exemption drops to zero once income exceeds `threshold`.
    ZeroAbove { threshold: Decimal },
}

impl ExemptionPhaseout {
    /// Whether the exemption survives at the given income.
    pub fn allows(
        &self,
        income: Decimal,
    ) -> bool {
        match self {
            Self::Full => true,
            Self::ZeroAbove { threshold } => income <= *threshold,
        }
    }
}

/// Payroll tax parameters. Rates are percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FicaRates {
    pub social_security_rate: Decimal,
    pub social_security_wage_base: Decimal,
    pub medicare_rate: Decimal,
}

/// Simplified alternative minimum tax parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtRates {
    pub exemption_amount: Decimal,
    /// Income at or above which the exemption is lost entirely.
    pub exemption_phaseout_threshold: Decimal,
    pub low_rate: Decimal,
    pub high_rate: Decimal,
    /// Incomes above this use `high_rate`.
    pub high_rate_threshold: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalRates {
    pub brackets: BracketSchedule,
    pub standard_deduction: Decimal,
    pub personal_exemption: Decimal,
    #[serde(default)]
    pub exemption_phaseout: ExemptionPhaseout,
    pub fica: FicaRates,
    /// Absent for rule sets that do not compare against an AMT.
    #[serde(default)]
    pub amt: Option<AmtRates>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRates {
    pub name: String,
    pub brackets: BracketSchedule,
    pub standard_deduction: Decimal,
    pub dependent_exemption: Decimal,
    /// Above this income itemized deductions are ignored for state purposes.
    #[serde(default)]
    pub itemized_income_limit: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRates {
    pub name: String,
    /// Name used beside the state's in combined totals, e.g. `City`.
    #[serde(default)]
    pub short_name: Option<String>,
    pub brackets: BracketSchedule,
    #[serde(default)]
    pub school_tax_credit: Option<Decimal>,
}

impl CityRates {
    /// `short_name` when configured, otherwise `name`.
    pub fn display_short_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }
}

/// Every parameter needed to assess one tax year.
///
/// Built once at startup and shared read-only between calculations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRates {
    pub tax_year: i32,
    pub federal: FederalRates,
    pub state: StateRates,
    pub city: CityRates,
}

impl YearRates {
    /// Checks every amount and rate that the bracket schedules do not already guard.
    pub fn validate(&self) -> Result<(), RateTableError> {
        let federal = &self.federal;
        let fica = &federal.fica;

        non_negative("federal.standard_deduction", federal.standard_deduction)?;
        non_negative("federal.personal_exemption", federal.personal_exemption)?;
        if let ExemptionPhaseout::ZeroAbove { threshold } = federal.exemption_phaseout {
            non_negative("federal.exemption_phaseout.threshold", threshold)?;
        }

        percentage("fica.social_security_rate", fica.social_security_rate)?;
        percentage("fica.medicare_rate", fica.medicare_rate)?;
        non_negative(
            "fica.social_security_wage_base",
            fica.social_security_wage_base,
        )?;

        if let Some(amt) = &federal.amt {
            non_negative("amt.exemption_amount", amt.exemption_amount)?;
            non_negative(
                "amt.exemption_phaseout_threshold",
                amt.exemption_phaseout_threshold,
            )?;
            non_negative("amt.high_rate_threshold", amt.high_rate_threshold)?;
            percentage("amt.low_rate", amt.low_rate)?;
            percentage("amt.high_rate", amt.high_rate)?;
        }

        non_negative("state.standard_deduction", self.state.standard_deduction)?;
        non_negative("state.dependent_exemption", self.state.dependent_exemption)?;
        if let Some(limit) = self.state.itemized_income_limit {
            non_negative("state.itemized_income_limit", limit)?;
        }
        if let Some(credit) = self.city.school_tax_credit {
            non_negative("city.school_tax_credit", credit)?;
        }

        Ok(())
    }
}

fn non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<(), RateTableError> {
    if value < Decimal::ZERO {
        return Err(RateTableError::NegativeAmount { field, value });
    }
    Ok(())
}

fn percentage(
    field: &'static str,
    value: Decimal,
) -> Result<(), RateTableError> {
    if value < Decimal::ZERO || value >= Decimal::ONE_HUNDRED {
        return Err(RateTableError::RateOutOfRange { field, value });
    }
    Ok(())
}
