use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tax_core::{RateTableError, YearRates};
use thiserror::Error;
use tracing::{info, warn};

const BUILTIN_RATES: &str = include_str!("../rates/nyc.toml");

/// Errors that can occur when building or querying a [`RateCatalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("tax year {year} is not supported (configured years: {})", list_years(.available))]
    UnsupportedTaxYear { year: i32, available: Vec<i32> },

    #[error("failed to read rate file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        source: toml::de::Error,
    },

    #[error("rates for tax year {year} are invalid: {source}")]
    InvalidRates {
        year: i32,
        source: RateTableError,
    },

    #[error("tax year {0} is configured more than once")]
    DuplicateYear(i32),
}

fn list_years(years: &[i32]) -> String {
    if years.is_empty() {
        return "none".to_string();
    }
    years
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// On-disk layout: one `[[year]]` table per tax year.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RateFile {
    #[serde(default)]
    year: Vec<YearRates>,
}

/// Validated rate tables keyed by tax year.
///
/// # Example
///
/// ```
/// use tax_data::RateCatalog;
///
/// let catalog = RateCatalog::builtin().unwrap();
/// assert_eq!(catalog.latest_year(), Some(2014));
/// assert!(catalog.get(1999).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateCatalog {
    years: BTreeMap<i32, YearRates>,
}

impl RateCatalog {
    /// The rate tables shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse(BUILTIN_RATES, "built-in rates")
    }

    /// Parses a rate file held in memory.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        Self::parse(content, "rate table")
    }

    /// Reads and parses a rate file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            warn!(path = %path.display(), error = %source, "Failed to read rate file");
            CatalogError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Self::parse(&content, &path.display().to_string())
    }

    fn parse(
        content: &str,
        origin: &str,
    ) -> Result<Self, CatalogError> {
        let file: RateFile = toml::from_str(content).map_err(|source| CatalogError::Parse {
            origin: origin.to_string(),
            source,
        })?;

        let mut catalog = Self::default();
        for rates in file.year {
            let year = rates.tax_year;
            if catalog.insert(rates)?.is_some() {
                return Err(CatalogError::DuplicateYear(year));
            }
        }

        info!(origin, years = ?catalog.years().collect::<Vec<_>>(), "Loaded rate catalog");
        Ok(catalog)
    }

    /// Validates and adds one year, returning the rates it replaced.
    pub fn insert(
        &mut self,
        rates: YearRates,
    ) -> Result<Option<YearRates>, CatalogError> {
        rates
            .validate()
            .map_err(|source| CatalogError::InvalidRates {
                year: rates.tax_year,
                source,
            })?;
        Ok(self.years.insert(rates.tax_year, rates))
    }

    /// Overlays `other`; its years replace any already present.
    pub fn merge(
        &mut self,
        other: RateCatalog,
    ) {
        for (year, rates) in other.years {
            if self.years.insert(year, rates).is_some() {
                info!(year, "Rate table overridden");
            }
        }
    }

    pub fn get(
        &self,
        year: i32,
    ) -> Result<&YearRates, CatalogError> {
        self.years
            .get(&year)
            .ok_or_else(|| CatalogError::UnsupportedTaxYear {
                year,
                available: self.years().collect(),
            })
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.years.keys().next_back().copied()
    }

    /// Configured years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}
