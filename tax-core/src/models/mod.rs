mod filer_input;
mod line_item;
mod tax_bracket;
mod tax_report;
pub(crate) mod tax_year_config;

pub use filer_input::{FilerInput, InputError, InputErrors, MAX_AMOUNT};
pub use line_item::{Amount, LineItem};
pub use tax_bracket::{Bracket, BracketSchedule, ScheduleError};
pub use tax_report::TaxReport;
pub use tax_year_config::{
    AmtRates, CityRates, ExemptionPhaseout, FederalRates, FicaRates, RateTableError, StateRates,
    YearRates,
};
