use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Digits, thousands commas and a decimal point. Signs and exponents are rejected.
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9,.]+$").expect("number pattern is valid"));

/// Largest income or deduction accepted: $1,000,000,000,000,000.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// A single problem found while validating raw filer input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Income must be specified.")]
    MissingIncome,

    #[error("Income must be greater than zero.")]
    ZeroIncome,

    #[error("Income: '{0}' is not valid.")]
    InvalidIncome(String),

    #[error("Income: '{0}' exceeds the largest supported amount.")]
    IncomeTooLarge(String),

    #[error("Deductions: '{0}' is not valid.")]
    InvalidDeductions(String),

    #[error("Deductions: '{0}' exceed the largest supported amount.")]
    DeductionsTooLarge(String),

    #[error("Exemptions: '{0}' is not valid.")]
    InvalidExemptions(String),

    #[error("The number of personal exemptions must be at least 1.")]
    TooFewExemptions,

    #[error("Tax year: '{0}' is not valid.")]
    InvalidTaxYear(String),
}

/// Every problem found in one piece of input, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputErrors(pub Vec<InputError>);

impl InputErrors {
    pub fn iter(&self) -> impl Iterator<Item = &InputError> {
        self.0.iter()
    }
}

impl fmt::Display for InputErrors {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("\n"))
    }
}

impl std::error::Error for InputErrors {}

/// A validated request for one tax assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilerInput {
    /// Adjusted gross income; always positive.
    pub income: Decimal,
    /// Itemized deductions other than state and local taxes.
    pub itemized_deductions: Decimal,
    /// Personal exemptions including the filer.
    pub exemptions: u32,
    pub tax_year: i32,
}

impl FilerInput {
    /// Validates raw form or command-line values.
    ///
    /// Empty `deductions` means `0` and empty `exemptions` means `1`. Numbers
    /// may carry thousands separators. All problems are reported together.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::{FilerInput, InputError};
    ///
    /// let input = FilerInput::parse("50,000", "", "", 2014).unwrap();
    /// assert_eq!(input.income, dec!(50000));
    /// assert_eq!(input.exemptions, 1);
    ///
    /// let errors = FilerInput::parse("-5", "abc", "2", 2014).unwrap_err();
    /// assert_eq!(
    ///     errors.0,
    ///     vec![
    ///         InputError::InvalidIncome("-5".to_string()),
    ///         InputError::InvalidDeductions("abc".to_string()),
    ///     ]
    /// );
    /// ```
    pub fn parse(
        income: &str,
        deductions: &str,
        exemptions: &str,
        tax_year: i32,
    ) -> Result<Self, InputErrors> {
        let mut errors = Vec::new();

        let income = match income.trim() {
            "" => {
                errors.push(InputError::MissingIncome);
                None
            }
            raw => match parse_amount(raw) {
                Some(value) if value.is_zero() => {
                    errors.push(InputError::ZeroIncome);
                    None
                }
                Some(value) if value > MAX_AMOUNT => {
                    errors.push(InputError::IncomeTooLarge(raw.to_string()));
                    None
                }
                Some(value) => Some(value),
                None => {
                    errors.push(InputError::InvalidIncome(raw.to_string()));
                    None
                }
            },
        };

        let itemized_deductions = match deductions.trim() {
            "" => Some(Decimal::ZERO),
            raw => match parse_amount(raw) {
                Some(value) if value > MAX_AMOUNT => {
                    errors.push(InputError::DeductionsTooLarge(raw.to_string()));
                    None
                }
                Some(value) => Some(value),
                None => {
                    errors.push(InputError::InvalidDeductions(raw.to_string()));
                    None
                }
            },
        };

        let exemptions = match exemptions.trim() {
            "" => Some(1),
            raw => match parse_count(raw) {
                Some(0) => {
                    errors.push(InputError::TooFewExemptions);
                    None
                }
                Some(count) => Some(count),
                None => {
                    errors.push(InputError::InvalidExemptions(raw.to_string()));
                    None
                }
            },
        };

        match (income, itemized_deductions, exemptions) {
            (Some(income), Some(itemized_deductions), Some(exemptions)) if errors.is_empty() => {
                Ok(Self {
                    income,
                    itemized_deductions,
                    exemptions,
                    tax_year,
                })
            }
            _ => Err(InputErrors(errors)),
        }
    }

    /// Like [`FilerInput::parse`] but also reads the tax year from text,
    /// falling back to `default_year` when it is empty.
    pub fn parse_with_year(
        income: &str,
        deductions: &str,
        exemptions: &str,
        tax_year: &str,
        default_year: i32,
    ) -> Result<Self, InputErrors> {
        let year = match tax_year.trim() {
            "" => Ok(default_year),
            raw => raw
                .parse::<i32>()
                .map_err(|_| InputError::InvalidTaxYear(raw.to_string())),
        };

        match (Self::parse(income, deductions, exemptions, default_year), year) {
            (Ok(input), Ok(year)) => Ok(Self {
                tax_year: year,
                ..input
            }),
            (Ok(_), Err(year_error)) => Err(InputErrors(vec![year_error])),
            (Err(InputErrors(mut errors)), Err(year_error)) => {
                errors.push(year_error);
                Err(InputErrors(errors))
            }
            (Err(errors), Ok(_)) => Err(errors),
        }
    }
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    if !NUMBER_PATTERN.is_match(raw) {
        return None;
    }
    raw.replace(',', "").parse::<Decimal>().ok()
}

fn parse_count(raw: &str) -> Option<u32> {
    if !NUMBER_PATTERN.is_match(raw) {
        return None;
    }
    let value = raw.replace(',', "").parse::<Decimal>().ok()?;
    if !value.fract().is_zero() {
        return None;
    }
    value.to_u32()
}
