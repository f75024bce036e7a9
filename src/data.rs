//! Rendering of fetch results as CSV, JSON or YAML.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use crate::batch::BatchReport;
use crate::github::Contributions;

pub mod csv;
pub mod yaml;

/// Output format of fetch results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `TYPE,LOGIN,NAME` rows.
    #[default]
    Csv,
    /// Pretty-printed JSON.
    Json,
    /// YAML document.
    Yaml,
}

/// Renders the result of a single repository or organization fetch.
pub fn render_contributions(contributions: &Contributions, format: OutputFormat) -> Result<String> {
    match (format, contributions) {
        (OutputFormat::Csv, Contributions::Synopsis(synopsis)) => Ok(csv::synopsis_to_csv(synopsis)),
        (OutputFormat::Csv, Contributions::Raw(_)) => {
            bail!("Dry-run results cannot be rendered as CSV; use --format json or yaml")
        }
        (format, contributions) => render_structured(contributions, format),
    }
}

/// Renders a batch report.
pub fn render_batch(report: &BatchReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Csv => Ok(csv::batch_to_csv(report)),
        format => render_structured(report, format),
    }
}

fn render_structured<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => yaml::to_yaml(data),
        OutputFormat::Json | OutputFormat::Csv => serde_json::to_string_pretty(data)
            .map(|json| json + "\n")
            .context("Failed to serialize to JSON"),
    }
}
