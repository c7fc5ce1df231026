//! Tax-year rate tables for the New York City tax engine.
//!
//! Rates live in TOML files with one `[[year]]` table per tax year. The 2014
//! single-filer table is embedded in the crate; further years can be loaded
//! from disk and merged over it.

mod catalog;

pub use catalog::{CatalogError, RateCatalog};
