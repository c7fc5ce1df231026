use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tax_core::{Amount, FilerInput, InputErrors, LineItem, TaxAggregator};
use tax_data::RateCatalog;
use tracing::{debug, info};

use crate::csv_loader;
use crate::render::OutputFormat;

/// Calculates total U.S. taxes owed by a single (unmarried) resident of NYC.
#[derive(Debug, Parser)]
#[command(name = "nyc-taxes", version, about, long_about = None)]
pub struct Cli {
    /// Annual gross income, e.g. `50,000`.
    pub income: Option<String>,

    /// Itemized deductions other than the standard deduction, personal
    /// exemptions, and state/local tax deductions.
    #[arg(short, long, default_value = "0")]
    pub deductions: String,

    /// Number of personal exemptions.
    #[arg(short, long, default_value = "1")]
    pub exemptions: String,

    /// Tax year to assess. Defaults to the latest configured year.
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Extra TOML rate file merged over the built-in tables.
    #[arg(short, long, value_name = "FILE")]
    pub rates: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// CSV file with one filer per row (`income`, `deductions`, `exemptions`, `tax_year`).
    #[arg(short, long, value_name = "FILE", conflicts_with = "income")]
    pub batch: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// What a run produced, for `main` to turn into an exit code.
#[derive(Debug)]
pub enum Outcome {
    /// A report was written.
    Reported,
    /// Nothing to do; the caller should print help.
    Help,
    /// Input failed validation.
    Invalid(InputErrors),
}

/// Builtin tables, with `extra` merged on top when given.
pub fn load_catalog(extra: Option<&Path>) -> Result<RateCatalog> {
    let mut catalog = RateCatalog::builtin().context("Failed to load built-in rate tables")?;

    if let Some(path) = extra {
        let overlay = RateCatalog::load(path)
            .with_context(|| format!("Failed to load rate file: {}", path.display()))?;
        catalog.merge(overlay);
    }

    Ok(catalog)
}

/// Executes one command-line invocation, writing the report to `out`.
pub fn run(
    cli: &Cli,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let catalog = load_catalog(cli.rates.as_deref())?;
    let year = match cli.year {
        Some(year) => year,
        None => catalog
            .latest_year()
            .context("No tax years are configured")?,
    };
    debug!(year, years = ?catalog.years().collect::<Vec<_>>(), "Rate catalog ready");

    if let Some(batch) = &cli.batch {
        return run_batch(&catalog, batch, year, cli.format, out);
    }

    let Some(income) = &cli.income else {
        return Ok(Outcome::Help);
    };

    let input = match FilerInput::parse(income, &cli.deductions, &cli.exemptions, year) {
        Ok(input) => input,
        Err(errors) => return Ok(Outcome::Invalid(errors)),
    };

    let rates = catalog.get(input.tax_year)?;
    let report = TaxAggregator::new(rates).report(&input);

    let mut renderer = cli.format.renderer();
    report.emit(&mut *renderer);
    out.write_all(renderer.finish().as_bytes())
        .context("Failed to write report")?;

    Ok(Outcome::Reported)
}

fn run_batch(
    catalog: &RateCatalog,
    path: &Path,
    default_year: i32,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let inputs = csv_loader::load_from_file(path, default_year)
        .with_context(|| format!("Failed to load batch file: {}", path.display()))?;
    info!(rows = inputs.len(), "Loaded batch file");

    let mut renderer = format.renderer();
    for (idx, input) in inputs.iter().enumerate() {
        let row = idx + 1;
        let rates = catalog
            .get(input.tax_year)
            .with_context(|| format!("Row {row}"))?;
        let report = TaxAggregator::new(rates).report(input);

        renderer.report(LineItem::text(format!(
            "Filer {row} ({}, income {})",
            input.tax_year,
            Amount::Money(input.income)
        )));
        renderer.report(LineItem::money(
            "Total Federal, State & Local Taxes",
            report.total_tax,
        ));
        renderer.report(LineItem::aggregate(
            "Effective Tax Rate",
            Amount::Percent(report.effective_rate),
        ));
        renderer.report(LineItem::aggregate(
            "Marginal Tax Rate",
            Amount::Percent(report.marginal_rate),
        ));
    }

    out.write_all(renderer.finish().as_bytes())
        .context("Failed to write batch report")?;

    Ok(Outcome::Reported)
}
