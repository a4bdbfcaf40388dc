//! `salesboard drill`: list the records behind one bar segment.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use salesboard_core::config::DashboardConfig;
use salesboard_core::drilldown::{DrillDown, DrillTable};
use salesboard_core::model::format_revenue;
use salesboard_core::selection::{SelectionEvent, SelectionListener};
use tracing::debug;

use crate::output::{OutputMode, pretty_kv, pretty_section, pretty_table, render_mode, text_table};

/// Arguments for `salesboard drill`.
#[derive(Args, Debug, Default)]
pub struct DrillArgs {
    /// CSV file to load (default: `data.path` from salesboard.toml).
    pub csv: Option<PathBuf>,

    /// Product of the segment to drill into.
    #[arg(long, requires = "month", conflicts_with = "payload")]
    pub product: Option<String>,

    /// Month of the segment to drill into, as it appears in the data.
    #[arg(long, requires = "product", conflicts_with = "payload")]
    pub month: Option<String>,

    /// A recorded chart click payload (JSON) to replay.
    #[arg(long, required_unless_present = "product", value_name = "JSON")]
    pub payload: Option<String>,
}

impl DrillArgs {
    /// The selection these arguments describe. `None` when the payload has no usable point.
    fn selection(&self) -> anyhow::Result<Option<SelectionEvent>> {
        if let Some(raw) = &self.payload {
            let payload: serde_json::Value =
                serde_json::from_str(raw).context("parse --payload as JSON")?;
            return Ok(SelectionEvent::from_click_payload(&payload));
        }
        Ok(self
            .product
            .as_ref()
            .zip(self.month.as_ref())
            .map(|(product, month)| SelectionEvent::new(product.as_str(), month.as_str())))
    }
}

/// Execute `salesboard drill`.
pub fn run_drill(
    args: &DrillArgs,
    config: &DashboardConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let selection = args.selection()?;
    let store = super::load_store(project_root, args.csv.as_deref(), config)?;

    let mut drill = DrillDown::new(&store);
    drill.on_selection(selection.as_ref());
    let Some(table) = drill.table() else {
        debug!("no selection, nothing to show");
        return Ok(());
    };

    let stdout = io::stdout();
    let mut w = stdout.lock();
    render_mode(&mut w, output, table, render_drill_text, render_drill_pretty)
}

fn render_drill_text(table: &DrillTable, w: &mut dyn Write) -> io::Result<()> {
    text_table(w, &table.columns, &table.rows)
}

fn render_drill_pretty(table: &DrillTable, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(
        w,
        &format!(
            "{} / {}",
            table.selection.product_name, table.selection.month_name
        ),
    )?;
    pretty_kv(w, "Records", table.row_count().to_string())?;
    pretty_kv(w, "Revenue", format_revenue(table.revenue_total))?;
    writeln!(w)?;
    pretty_table(w, &table.columns, &table.rows)
}
