//! Command handlers for the `salesboard` binary.

pub mod drill;
pub mod run;
pub mod summary;

use anyhow::Context;
use salesboard_core::config::DashboardConfig;
use salesboard_core::store::DataStore;
use std::path::{Path, PathBuf};

/// The CSV to load: the command argument if given, else `data.path` from config.
///
/// Relative paths resolve against `project_root`.
pub fn resolve_csv_path(project_root: &Path, csv: Option<&Path>, config: &DashboardConfig) -> PathBuf {
    let path = csv.unwrap_or(&config.data.path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

/// Load the sales data every command starts from.
pub fn load_store(
    project_root: &Path,
    csv: Option<&Path>,
    config: &DashboardConfig,
) -> anyhow::Result<DataStore> {
    let path = resolve_csv_path(project_root, csv, config);
    DataStore::load_csv(&path).context("load sales data")
}
