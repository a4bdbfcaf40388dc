//! Terminal user interface (TUI) for salesboard.
//!
//! One screen: the stacked revenue chart on top, the drill-down table below
//! it, and a key hint line at the bottom. Input is handled one event at a
//! time; a chart selection is filtered and the table rebuilt before the next
//! event is read.
//!
//! ## Entry points
//!
//! - [`run_dashboard`]: take over the terminal and run until the user quits.

pub mod chart;
pub mod table;

use anyhow::{Context, Result, bail};
use chart::ChartView;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use salesboard_core::config::DashboardConfig;
use salesboard_core::figure::StackedBarFigure;
use salesboard_core::selection::{SelectionEvent, SelectionListener};
use salesboard_core::store::DataStore;
use std::io::{self, IsTerminal};
use std::time::Duration;
use table::DrillTableView;
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Chart, table and the wiring between them.
#[derive(Debug)]
pub struct Dashboard<'a> {
    chart: ChartView<'a>,
    table: DrillTableView<'a>,
    table_height: u16,
    should_quit: bool,
}

impl<'a> Dashboard<'a> {
    #[must_use]
    pub fn new(store: &'a DataStore, figure: &'a StackedBarFigure, config: &DashboardConfig) -> Self {
        Self {
            chart: ChartView::new(
                figure,
                config.chart.title.clone(),
                config.chart.bar_width,
                config.chart.bar_gap,
            ),
            table: DrillTableView::new(store),
            table_height: config.table.height,
            should_quit: false,
        }
    }

    #[must_use]
    pub const fn chart(&self) -> &ChartView<'a> {
        &self.chart
    }

    #[must_use]
    pub const fn table(&self) -> &DrillTableView<'a> {
        &self.table
    }

    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Forward a chart selection to the drill-down listener.
    pub fn dispatch(&mut self, event: Option<&SelectionEvent>) -> bool {
        dispatch_to(&mut self.table, event)
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let selection = self.chart.handle_key(key);
                self.dispatch(selection.as_ref());
            }
            _ => {
                if !self.table.handle_key(key) {
                    self.chart.handle_key(key);
                }
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let selection = self.chart.handle_mouse(mouse);
        if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) && selection.is_some() {
            self.dispatch(selection.as_ref());
        }
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        render_into(frame, self, area);
    }
}

fn dispatch_to<L: SelectionListener>(listener: &mut L, event: Option<&SelectionEvent>) -> bool {
    let changed = listener.on_selection(event);
    if !changed {
        debug!("selection produced no update");
    }
    changed
}

fn render_into(frame: &mut Frame<'_>, app: &mut Dashboard<'_>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(app.table_height),
            Constraint::Length(1),
        ])
        .split(area);

    app.chart.render(frame, chunks[0]);
    app.table.render(frame, chunks[1]);
    render_status(frame, chunks[2]);
}

fn render_status(frame: &mut Frame<'_>, area: Rect) {
    let key = Style::default().fg(Color::Yellow);
    let spans = vec![
        Span::styled("click", key),
        Span::raw(" drill down  "),
        Span::styled("←/→ ↑/↓", key),
        Span::raw(" move  "),
        Span::styled("enter", key),
        Span::raw(" select  "),
        Span::styled("pgup/pgdn", key),
        Span::raw(" scroll table  "),
        Span::styled("q", key),
        Span::raw(" quit"),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Restores the terminal when dropped, including on early return.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)
            .context("enter alternate screen")?;

        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            original_hook(info);
        }));
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

/// Run the interactive dashboard until the user quits.
///
/// # Errors
///
/// Fails when stdout is not a terminal or the terminal cannot be driven.
pub fn run_dashboard(
    store: &DataStore,
    figure: &StackedBarFigure,
    config: &DashboardConfig,
) -> Result<()> {
    if !io::stdout().is_terminal() {
        bail!("stdout is not a terminal; use `salesboard summary` or `salesboard drill` instead");
    }

    let _guard = TerminalGuard::enter()?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(io::stdout())).context("create terminal")?;

    let mut app = Dashboard::new(store, figure, config);
    info!(
        segments = figure.segment_count(),
        months = figure.months().len(),
        "dashboard started"
    );
    let result = run_loop(&mut terminal, &mut app);
    terminal.show_cursor().ok();
    info!("dashboard closed");
    result
}

fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut Dashboard<'_>) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(POLL_INTERVAL)? {
            let event = event::read()?;
            app.handle_event(&event);
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
