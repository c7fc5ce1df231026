pub mod calculations;
pub mod models;
pub mod reporting;

pub use calculations::{TaxAggregator, calculate_taxes};
pub use models::*;
pub use reporting::{NoopReporter, Reporter};
