use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{format_money, format_percent};

/// A figure attached to a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Amount {
    Money(Decimal),
    /// A percentage, `26.81` meaning 26.81%.
    Percent(Decimal),
}

impl Amount {
    pub fn value(&self) -> Decimal {
        match self {
            Self::Money(v) | Self::Percent(v) => *v,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Money(v) => f.write_str(&format_money(*v)),
            Self::Percent(v) => f.write_str(&format_percent(*v)),
        }
    }
}

/// One reportable fact, emitted in pipeline order.
///
/// Presentation layers must keep the order they receive these in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineItem {
    /// A standalone total such as "Federal Taxable Income".
    Aggregate { label: String, amount: Amount },
    /// Opens a section whose details follow.
    SectionStart { label: String },
    /// One breakdown line inside a section.
    Detail { text: String },
    /// Closes a section with its total.
    SectionEnd { label: String, amount: Amount },
    /// A free-standing note.
    Text { text: String },
}

impl LineItem {
    pub fn aggregate(
        label: impl Into<String>,
        amount: Amount,
    ) -> Self {
        Self::Aggregate {
            label: label.into(),
            amount,
        }
    }

    pub fn money(
        label: impl Into<String>,
        value: Decimal,
    ) -> Self {
        Self::aggregate(label, Amount::Money(value))
    }

    pub fn section_start(label: impl Into<String>) -> Self {
        Self::SectionStart {
            label: label.into(),
        }
    }

    pub fn detail(text: impl Into<String>) -> Self {
        Self::Detail { text: text.into() }
    }

    pub fn section_end(
        label: impl Into<String>,
        value: Decimal,
    ) -> Self {
        Self::SectionEnd {
            label: label.into(),
            amount: Amount::Money(value),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Label of aggregate and section lines.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Aggregate { label, .. }
            | Self::SectionStart { label }
            | Self::SectionEnd { label, .. } => Some(label),
            Self::Detail { .. } | Self::Text { .. } => None,
        }
    }

    pub fn amount(&self) -> Option<Amount> {
        match self {
            Self::Aggregate { amount, .. } | Self::SectionEnd { amount, .. } => Some(*amount),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn money_amount_displays_with_dollar_and_commas() {
        assert_eq!(Amount::Money(dec!(13403.512)).to_string(), "$13,403.51");
    }

    #[test]
    fn percent_amount_displays_two_places() {
        assert_eq!(Amount::Percent(dec!(26.807024)).to_string(), "26.81%");
    }

    #[test]
    fn label_is_absent_for_details() {
        assert_eq!(LineItem::detail("x").label(), None);
        assert_eq!(
            LineItem::section_start("Federal Income Tax").label(),
            Some("Federal Income Tax")
        );
    }

    #[test]
    fn amount_only_on_totals() {
        assert_eq!(
            LineItem::section_end("FICA", dec!(3825)).amount(),
            Some(Amount::Money(dec!(3825)))
        );
        assert_eq!(LineItem::text("note").amount(), None);
    }
}
