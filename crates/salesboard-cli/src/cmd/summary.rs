//! `salesboard summary`: aggregate revenue per product and month.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use salesboard_core::aggregate::{AggregateRow, aggregate, total_revenue};
use salesboard_core::config::DashboardConfig;
use salesboard_core::model::format_revenue;
use serde::Serialize;

use crate::output::{OutputMode, pretty_kv, pretty_section, pretty_table, render_mode, text_table};

/// Arguments for `salesboard summary`.
#[derive(Args, Debug, Default)]
pub struct SummaryArgs {
    /// CSV file to load (default: `data.path` from salesboard.toml).
    pub csv: Option<PathBuf>,
}

/// Report payload for `salesboard summary`.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub record_count: usize,
    pub rows: Vec<AggregateRow>,
    pub total_revenue: f64,
}

/// Execute `salesboard summary`.
pub fn run_summary(
    args: &SummaryArgs,
    config: &DashboardConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let store = super::load_store(project_root, args.csv.as_deref(), config)?;
    let rows = aggregate(store.records());
    let report = SummaryReport {
        record_count: store.len(),
        total_revenue: total_revenue(&rows),
        rows,
    };

    let stdout = io::stdout();
    let mut w = stdout.lock();
    render_mode(&mut w, output, &report, render_summary_text, render_summary_pretty)
}

fn headers() -> Vec<String> {
    ["Product Name", "Month Name", "Revenue", "Records"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn table_rows(report: &SummaryReport) -> Vec<Vec<String>> {
    report
        .rows
        .iter()
        .map(|row| {
            vec![
                row.product_name.clone(),
                row.month_name.clone(),
                format_revenue(row.revenue_sum),
                row.record_count.to_string(),
            ]
        })
        .collect()
}

fn render_summary_text(report: &SummaryReport, w: &mut dyn Write) -> io::Result<()> {
    text_table(w, &headers(), &table_rows(report))
}

fn render_summary_pretty(report: &SummaryReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Revenue by product and month")?;
    pretty_kv(w, "Records", report.record_count.to_string())?;
    pretty_kv(w, "Groups", report.rows.len().to_string())?;
    pretty_kv(w, "Revenue", format_revenue(report.total_revenue))?;
    writeln!(w)?;
    pretty_table(w, &headers(), &table_rows(report))
}
