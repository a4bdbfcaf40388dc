//! Drill-down table shown below the chart.
//!
//! Wraps the core [`DrillDown`] state machine. The region is empty until the
//! first selection arrives; each selection replaces the table wholesale.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};
use salesboard_core::drilldown::{DrillDown, DrillTable};
use salesboard_core::model::format_revenue;
use salesboard_core::selection::{SelectionEvent, SelectionListener};
use salesboard_core::store::DataStore;

const MAX_COLUMN_WIDTH: usize = 32;

#[derive(Debug)]
pub struct DrillTableView<'a> {
    drill: DrillDown<'a>,
    /// First visible data row.
    offset: usize,
    /// Data rows that fit in the last render.
    page: usize,
}

impl<'a> DrillTableView<'a> {
    #[must_use]
    pub const fn new(store: &'a DataStore) -> Self {
        Self {
            drill: DrillDown::new(store),
            offset: 0,
            page: 1,
        }
    }

    #[must_use]
    pub const fn drill(&self) -> &DrillDown<'a> {
        &self.drill
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Scroll with PageUp/PageDown/Home/End. Returns true if the key was used.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let Some(table) = self.drill.table() else {
            return false;
        };
        let last = table.row_count().saturating_sub(self.page.max(1));
        match key.code {
            KeyCode::PageDown => self.offset = (self.offset + self.page.max(1)).min(last),
            KeyCode::PageUp => self.offset = self.offset.saturating_sub(self.page.max(1)),
            KeyCode::Home => self.offset = 0,
            KeyCode::End => self.offset = last,
            _ => return false,
        }
        true
    }

    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(Color::DarkGray));

        let Some(table) = self.drill.table() else {
            let hint = Paragraph::new(
                "Click a bar segment, or pick one with ←/→ ↑/↓ and press Enter, to list its sales records.",
            )
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block.title(" Records "));
            frame.render_widget(hint, area);
            return;
        };

        let block = block.title(table_title(table)).title_style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        // Borders plus the header row.
        self.page = usize::from(area.height.saturating_sub(3)).max(1);

        let header = Row::new(table.columns.iter().map(|c| Cell::from(c.as_str())))
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        let rows = table
            .rows
            .iter()
            .map(|row| Row::new(row.iter().map(|v| Cell::from(v.as_str()))));

        let widget = Table::new(rows, column_widths(table))
            .header(header)
            .block(block)
            .column_spacing(2);

        let mut state = TableState::default().with_offset(self.offset);
        frame.render_stateful_widget(widget, area, &mut state);
    }
}

impl SelectionListener for DrillTableView<'_> {
    fn on_selection(&mut self, event: Option<&SelectionEvent>) -> bool {
        let changed = self.drill.on_selection(event);
        if changed {
            self.offset = 0;
        }
        changed
    }
}

fn table_title(table: &DrillTable) -> String {
    let noun = if table.row_count() == 1 { "record" } else { "records" };
    format!(
        " {} / {}: {} {noun}, revenue {} ",
        table.selection.product_name,
        table.selection.month_name,
        table.row_count(),
        format_revenue(table.revenue_total),
    )
}

fn column_widths(table: &DrillTable) -> Vec<Constraint> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let widest = table
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|v| v.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(1)
                .min(MAX_COLUMN_WIDTH);
            Constraint::Length(u16::try_from(widest).unwrap_or(u16::MAX))
        })
        .collect()
}
