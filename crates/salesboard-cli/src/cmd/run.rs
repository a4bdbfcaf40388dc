//! `salesboard run`: the interactive dashboard.

use std::path::{Path, PathBuf};

use clap::Args;
use salesboard_core::aggregate::aggregate;
use salesboard_core::config::DashboardConfig;
use salesboard_core::figure::StackedBarFigure;
use tracing::info;

use crate::tui;

/// Arguments for `salesboard run`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// CSV file to load (default: `data.path` from salesboard.toml).
    pub csv: Option<PathBuf>,
}

/// Execute `salesboard run`.
pub fn run_interactive(
    args: &RunArgs,
    config: &DashboardConfig,
    project_root: &Path,
) -> anyhow::Result<()> {
    let store = super::load_store(project_root, args.csv.as_deref(), config)?;
    let rows = aggregate(store.records());
    let figure = StackedBarFigure::build(&rows, config.chart.month_order);
    info!(
        products = figure.series().len(),
        months = figure.months().len(),
        "figure ready"
    );

    tui::run_dashboard(&store, &figure, config)
}
