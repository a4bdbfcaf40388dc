use crate::error::{Error, Result};
use crate::figure::MonthOrder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "salesboard.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub table: TableConfig,
    /// Preferred output mode for non-interactive commands.
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_title")]
    pub title: String,
    #[serde(default)]
    pub month_order: MonthOrder,
    #[serde(default = "default_bar_width")]
    pub bar_width: u16,
    #[serde(default = "default_bar_gap")]
    pub bar_gap: u16,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: default_chart_title(),
            month_order: MonthOrder::default(),
            bar_width: default_bar_width(),
            bar_gap: default_bar_gap(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Rows of screen space reserved for the drill-down table.
    #[serde(default = "default_table_height")]
    pub height: u16,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            height: default_table_height(),
        }
    }
}

/// Load the dashboard config.
///
/// With an explicit `path` the file must exist. Without one,
/// `salesboard.toml` in `project_root` is used when present and defaults
/// apply otherwise.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and
/// [`Error::ConfigParse`] if it is not valid TOML for this schema.
pub fn load_config(project_root: &Path, path: Option<&Path>) -> Result<DashboardConfig> {
    let path = match path {
        Some(explicit) => explicit.to_path_buf(),
        None => {
            let candidate = project_root.join(CONFIG_FILE_NAME);
            if !candidate.exists() {
                return Ok(DashboardConfig::default());
            }
            candidate
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;

    toml::from_str::<DashboardConfig>(&content).map_err(|source| Error::ConfigParse { path, source })
}

fn default_data_path() -> PathBuf {
    PathBuf::from("assets/sales_data.csv")
}

fn default_chart_title() -> String {
    "Revenue by Product and Month".to_string()
}

const fn default_bar_width() -> u16 {
    7
}

const fn default_bar_gap() -> u16 {
    2
}

const fn default_table_height() -> u16 {
    12
}
