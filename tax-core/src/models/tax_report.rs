use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line_item::LineItem;
use crate::reporting::Reporter;

/// The complete outcome of one filer's assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxReport {
    /// Report lines in emission order.
    pub lines: Vec<LineItem>,
    pub total_tax: Decimal,
    pub after_tax_income: Decimal,
    /// Percentage of income paid in tax; zero when income is zero.
    pub effective_rate: Decimal,
    /// After-tax income divided over twelve months.
    pub monthly_income: Decimal,
    /// Percentage of the next dollar of income paid in tax.
    pub marginal_rate: Decimal,
}

impl TaxReport {
    /// Replays every line, in order, to a reporter.
    pub fn emit<R: Reporter + ?Sized>(
        &self,
        reporter: &mut R,
    ) {
        for line in &self.lines {
            reporter.report(line.clone());
        }
    }
}
