//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions for
//! presenting catalogs, inspection results, and run reports in a
//! human-readable format.

use tabled::{Table, Tabled};

use ogrconv_core::catalog::Format;
use ogrconv_core::inspect::SourceReport;
use ogrconv_core::projection::Projection;
use ogrconv_core::run::RunReport;

/// Table row representation for displaying a format catalog entry.
#[derive(Tabled)]
pub struct FormatRow {
    /// Format name as passed to the conversion tool.
    #[tabled(rename = "Name")]
    pub name: String,
    /// File extension or connection/protocol token.
    #[tabled(rename = "Tag")]
    pub tag: String,
    /// Whether the format can be written.
    #[tabled(rename = "Writable")]
    pub writable: String,
}

/// Table row representation for displaying a projection catalog entry.
#[derive(Tabled)]
pub struct ProjectionRow {
    /// Numeric EPSG code.
    #[tabled(rename = "EPSG")]
    pub code: u32,
    /// Coordinate reference system description.
    #[tabled(rename = "Description")]
    pub description: String,
}

/// Table row representation for one per-entry conversion outcome.
#[derive(Tabled)]
pub struct OutcomeRow {
    /// The concrete source that was converted.
    #[tabled(rename = "Source")]
    pub source: String,
    /// Whether the entry converted successfully.
    #[tabled(rename = "Status")]
    pub status: String,
    /// Exit code or failure summary.
    #[tabled(rename = "Detail")]
    pub detail: String,
}

/// Display a format catalog section as a table.
pub fn display_formats(heading: &str, formats: &[Format]) {
    println!("\n{heading} ({} total):\n", formats.len());

    let rows: Vec<FormatRow> = formats
        .iter()
        .map(|f| FormatRow {
            name: f.name.to_string(),
            tag: f.tag.to_string(),
            writable: if f.writable { "Yes" } else { "No" }.to_string(),
        })
        .collect();

    let table = Table::new(rows).to_string();
    println!("{table}");
}

/// Display projection catalog entries as a table.
pub fn display_projections(projections: &[&Projection]) {
    println!("\nProjections ({} total):\n", projections.len());

    let rows: Vec<ProjectionRow> = projections
        .iter()
        .map(|p| ProjectionRow {
            code: p.code,
            description: p.description.to_string(),
        })
        .collect();

    let table = Table::new(rows).to_string();
    println!("{table}");
}

/// Display what an inspection found out about a source.
pub fn display_inspection(location: &str, report: &SourceReport) {
    println!("\nSource: {location}");
    match report.epsg {
        Some(code) => println!("Detected CRS: EPSG:{code}"),
        None => println!("Detected CRS: unknown"),
    }
    match &report.suggested_query {
        Some(query) => println!("Suggested query: {query}"),
        None => println!("Suggested query: none"),
    }
}

/// Display the per-entry outcomes of a conversion run as a table.
pub fn display_report(report: &RunReport) {
    let rows: Vec<OutcomeRow> = report
        .outcomes
        .iter()
        .map(|o| OutcomeRow {
            source: o.source.clone(),
            status: if o.succeeded() { "ok" } else { "failed" }.to_string(),
            detail: match &o.result {
                Ok(status) => format!("exit {}", status.exit_code),
                Err(e) => e.to_string(),
            },
        })
        .collect();

    let table = Table::new(rows).to_string();
    println!("{table}");
    println!(
        "\n{} of {} entries converted.",
        report.outcomes.len() - report.failed(),
        report.outcomes.len()
    );
}
