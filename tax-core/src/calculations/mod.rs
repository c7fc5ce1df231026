//! Tax calculations for a single New York City filer.
//!
//! Each stage lives in its own module and produces both figures and the
//! report lines describing them. [`aggregator`] strings the stages together.

pub mod aggregator;
pub mod amt;
pub mod common;
pub mod deduction;
pub mod fica;
pub mod slab;

pub use aggregator::{Assessment, TaxAggregator, calculate_taxes};
pub use amt::{Amt, compute_amt};
pub use deduction::{Deduction, DeductionResolver};
pub use fica::{Fica, compute_fica};
pub use slab::{Slab, SlabTax, compute_slab_tax};
