use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a bracket schedule violates its ordering invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("bracket schedule is empty")]
    Empty,

    #[error("bracket {index}: upper bound must be positive, got {bound}")]
    NonPositiveBound { index: usize, bound: Decimal },

    #[error("bracket {index}: upper bound {bound} does not exceed previous bound {previous}")]
    NotIncreasing {
        index: usize,
        bound: Decimal,
        previous: Decimal,
    },

    #[error("bracket {index}: only the last bracket may be unbounded")]
    UnboundedBeforeEnd { index: usize },

    #[error("last bracket must be unbounded, got upper bound {0}")]
    BoundedFinalBracket(Decimal),

    #[error("bracket {index}: rate must be in [0, 100), got {rate}")]
    RateOutOfRange { index: usize, rate: Decimal },
}

/// One tier of a progressive schedule.
///
/// `upper_bound` of `None` marks the open-ended top bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Percentage applied to income inside this tier (`10` means 10%).
    pub rate: Decimal,
}

impl Bracket {
    pub fn bounded(
        upper_bound: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        Self {
            upper_bound: None,
            rate,
        }
    }
}

/// An ordered, validated list of brackets.
///
/// Bounds are strictly increasing and the final bracket is unbounded, so every
/// non-negative income falls inside exactly one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bracket>", into = "Vec<Bracket>")]
pub struct BracketSchedule {
    brackets: Vec<Bracket>,
}

impl BracketSchedule {
    /// Builds a schedule, checking the ordering invariants.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::{Bracket, BracketSchedule, ScheduleError};
    ///
    /// let schedule = BracketSchedule::new(vec![
    ///     Bracket::bounded(dec!(9075), dec!(10)),
    ///     Bracket::unbounded(dec!(15)),
    /// ]);
    /// assert!(schedule.is_ok());
    ///
    /// let missing_top = BracketSchedule::new(vec![Bracket::bounded(dec!(9075), dec!(10))]);
    /// assert_eq!(missing_top, Err(ScheduleError::BoundedFinalBracket(dec!(9075))));
    /// ```
    pub fn new(brackets: Vec<Bracket>) -> Result<Self, ScheduleError> {
        if brackets.is_empty() {
            return Err(ScheduleError::Empty);
        }

        let last = brackets.len() - 1;
        let mut previous: Option<Decimal> = None;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate >= Decimal::ONE_HUNDRED {
                return Err(ScheduleError::RateOutOfRange {
                    index,
                    rate: bracket.rate,
                });
            }

            match bracket.upper_bound {
                Some(bound) if index == last => {
                    return Err(ScheduleError::BoundedFinalBracket(bound));
                }
                Some(bound) => {
                    if bound <= Decimal::ZERO {
                        return Err(ScheduleError::NonPositiveBound { index, bound });
                    }
                    if let Some(previous) = previous.filter(|p| bound <= *p) {
                        return Err(ScheduleError::NotIncreasing {
                            index,
                            bound,
                            previous,
                        });
                    }
                    previous = Some(bound);
                }
                None if index != last => {
                    return Err(ScheduleError::UnboundedBeforeEnd { index });
                }
                None => {}
            }
        }

        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }
}

impl TryFrom<Vec<Bracket>> for BracketSchedule {
    type Error = ScheduleError;

    fn try_from(brackets: Vec<Bracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketSchedule> for Vec<Bracket> {
    fn from(schedule: BracketSchedule) -> Self {
        schedule.brackets
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn federal_2014() -> Vec<Bracket> {
        vec![
            Bracket::bounded(dec!(9075), dec!(10)),
            Bracket::bounded(dec!(36900), dec!(15)),
            Bracket::bounded(dec!(89350), dec!(25)),
            Bracket::bounded(dec!(186350), dec!(28)),
            Bracket::bounded(dec!(405100), dec!(33)),
            Bracket::bounded(dec!(406750), dec!(35)),
            Bracket::unbounded(dec!(39.6)),
        ]
    }

    #[test]
    fn accepts_ordered_schedule() {
        let schedule = BracketSchedule::new(federal_2014()).unwrap();

        assert_eq!(schedule.brackets().len(), 7);
        assert_eq!(schedule.brackets()[6].upper_bound, None);
    }

    #[test]
    fn accepts_single_unbounded_bracket() {
        let schedule = BracketSchedule::new(vec![Bracket::unbounded(dec!(5))]).unwrap();

        assert_eq!(schedule.brackets().len(), 1);
    }

    #[test]
    fn rejects_empty_schedule() {
        assert_eq!(BracketSchedule::new(vec![]), Err(ScheduleError::Empty));
    }

    #[test]
    fn rejects_bounded_final_bracket() {
        let mut brackets = federal_2014();
        brackets.pop();

        assert_eq!(
            BracketSchedule::new(brackets),
            Err(ScheduleError::BoundedFinalBracket(dec!(406750)))
        );
    }

    #[test]
    fn rejects_unbounded_bracket_before_end() {
        let brackets = vec![Bracket::unbounded(dec!(10)), Bracket::unbounded(dec!(15))];

        assert_eq!(
            BracketSchedule::new(brackets),
            Err(ScheduleError::UnboundedBeforeEnd { index: 0 })
        );
    }

    #[test]
    fn rejects_non_increasing_bounds() {
        let brackets = vec![
            Bracket::bounded(dec!(9075), dec!(10)),
            Bracket::bounded(dec!(9075), dec!(15)),
            Bracket::unbounded(dec!(25)),
        ];

        assert_eq!(
            BracketSchedule::new(brackets),
            Err(ScheduleError::NotIncreasing {
                index: 1,
                bound: dec!(9075),
                previous: dec!(9075),
            })
        );
    }

    #[test]
    fn rejects_rate_of_one_hundred() {
        let brackets = vec![Bracket::unbounded(dec!(100))];

        assert_eq!(
            BracketSchedule::new(brackets),
            Err(ScheduleError::RateOutOfRange {
                index: 0,
                rate: dec!(100),
            })
        );
    }

    #[test]
    fn rejects_negative_rate() {
        let brackets = vec![
            Bracket::bounded(dec!(1000), dec!(-1)),
            Bracket::unbounded(dec!(5)),
        ];

        assert!(matches!(
            BracketSchedule::new(brackets),
            Err(ScheduleError::RateOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_zero_bound() {
        let brackets = vec![
            Bracket::bounded(dec!(0), dec!(1)),
            Bracket::unbounded(dec!(5)),
        ];

        assert_eq!(
            BracketSchedule::new(brackets),
            Err(ScheduleError::NonPositiveBound {
                index: 0,
                bound: dec!(0),
            })
        );
    }
}
