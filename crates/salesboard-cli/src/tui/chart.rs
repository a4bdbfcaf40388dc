//! Stacked revenue bar chart.
//!
//! Months run along the horizontal axis and each month's stack holds one
//! segment per product. The geometry of the last render is kept in a
//! [`ChartLayout`] so mouse clicks can be resolved back to a segment: the month
//! comes from the axis category under the click column, the product from the
//! identifier attached to the segment under the click.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use salesboard_core::figure::StackedBarFigure;
use salesboard_core::selection::SelectionEvent;

/// Series colours, assigned by palette index.
pub const PALETTE: [Color; 8] = [
    Color::Blue,
    Color::Red,
    Color::Green,
    Color::Magenta,
    Color::Cyan,
    Color::Yellow,
    Color::LightBlue,
    Color::LightRed,
];

const BAR_SYMBOL: &str = "█";
const CURSOR_SYMBOL: &str = "▒";

#[must_use]
pub const fn series_color(palette_index: usize) -> Color {
    PALETTE[palette_index % PALETTE.len()]
}

/// Horizontal extent of one month category on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryColumn {
    pub month: usize,
    pub x: u16,
    pub width: u16,
}

/// A drawn segment, tagged with the product it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentHit {
    pub month: usize,
    pub segment: usize,
    pub product_name: String,
    pub rect: Rect,
}

/// Geometry of one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartLayout {
    /// Area holding the bars, below the legend and above the month labels.
    pub plot: Rect,
    /// Width of the y-axis label gutter left of the plot.
    pub gutter: u16,
    pub bar_width: u16,
    pub first_month: usize,
    pub columns: Vec<CategoryColumn>,
    pub segments: Vec<SegmentHit>,
}

impl ChartLayout {
    /// The month category whose bar spans column `x`.
    #[must_use]
    pub fn category_at(&self, x: u16) -> Option<&CategoryColumn> {
        self.columns
            .iter()
            .find(|c| x >= c.x && x < c.x.saturating_add(c.width))
    }

    /// The segment drawn at `(x, y)` within `month`'s stack.
    #[must_use]
    pub fn segment_at(&self, month: usize, x: u16, y: u16) -> Option<&SegmentHit> {
        self.segments
            .iter()
            .find(|s| s.month == month && s.rect.contains(Position::new(x, y)))
    }

    #[must_use]
    pub fn visible_months(&self) -> usize {
        self.columns.len()
    }
}

/// Compact axis label: `950`, `47.5k`, `1.2M`.
#[must_use]
pub fn format_axis_value(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{value:.0}")
    }
}

fn text_width(s: &str) -> u16 {
    u16::try_from(s.chars().count()).unwrap_or(u16::MAX)
}

/// Scale `value` against `max` onto `height` rows.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(value: f64, max: f64, height: u16) -> u16 {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    let rows = (value / max * f64::from(height)).round();
    (rows.min(f64::from(height))) as u16
}

/// Lay out `figure` inside `area` (the chart block's inner area).
///
/// Rows: legend on top, month labels at the bottom, bars in between. When
/// every month does not fit at `bar_width`, bars narrow down to one column and
/// then the view shows a window of months starting at `first_month`.
#[must_use]
pub fn compute_layout(
    figure: &StackedBarFigure,
    area: Rect,
    bar_width: u16,
    bar_gap: u16,
    first_month: usize,
) -> ChartLayout {
    let months = figure.months();
    if months.is_empty() || area.height < 3 || area.width < 4 {
        return ChartLayout::default();
    }

    let max = figure.max_stack_total();
    let gutter = text_width(&format_axis_value(max)).max(1) + 1;
    let plot = Rect {
        x: area.x + gutter,
        y: area.y + 1,
        width: area.width.saturating_sub(gutter),
        height: area.height - 2,
    };

    // One blank column after the axis line.
    let usable = plot.width.saturating_sub(1);
    let count = u16::try_from(months.len()).unwrap_or(u16::MAX);
    let mut width = bar_width.max(1);
    if count.saturating_mul(width.saturating_add(bar_gap)) > usable {
        width = (usable / count).saturating_sub(bar_gap).max(1);
    }
    let slot = width.saturating_add(bar_gap);
    let fits = usize::from((usable.saturating_add(bar_gap) / slot).max(1));

    let first_month = first_month.min(months.len().saturating_sub(fits));
    let mut layout = ChartLayout {
        plot,
        gutter,
        bar_width: width,
        first_month,
        columns: Vec::new(),
        segments: Vec::new(),
    };

    let mut x = plot.x + 1;
    for (month, stack) in months.iter().enumerate().skip(first_month).take(fits) {
        if x.saturating_add(width) > plot.right() {
            break;
        }
        layout.columns.push(CategoryColumn { month, x, width });

        let mut cumulative = 0.0;
        for (segment, seg) in stack.segments.iter().enumerate() {
            let bottom = scale(cumulative, max, plot.height);
            cumulative += seg.value.max(0.0);
            let top = scale(cumulative, max, plot.height);
            let height = top.saturating_sub(bottom);
            if height == 0 {
                continue;
            }
            layout.segments.push(SegmentHit {
                month,
                segment,
                product_name: seg.product_name.clone(),
                rect: Rect {
                    x,
                    y: plot.bottom() - top,
                    width,
                    height,
                },
            });
        }

        x = x.saturating_add(slot);
    }

    layout
}

/// Interactive stacked bar chart over an immutable figure.
#[derive(Debug)]
pub struct ChartView<'a> {
    figure: &'a StackedBarFigure,
    title: String,
    bar_width: u16,
    bar_gap: u16,
    /// Keyboard cursor: (month, segment).
    cursor: Option<(usize, usize)>,
    first_month: usize,
    layout: ChartLayout,
}

impl<'a> ChartView<'a> {
    #[must_use]
    pub fn new(figure: &'a StackedBarFigure, title: impl Into<String>, bar_width: u16, bar_gap: u16) -> Self {
        Self {
            figure,
            title: title.into(),
            bar_width,
            bar_gap,
            cursor: (!figure.is_empty()).then_some((0, 0)),
            first_month: 0,
            layout: ChartLayout::default(),
        }
    }

    #[must_use]
    pub const fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    #[must_use]
    pub const fn cursor(&self) -> Option<(usize, usize)> {
        self.cursor
    }

    /// Resolve a screen position to the selection it would produce.
    #[must_use]
    pub fn selection_at(&self, x: u16, y: u16) -> Option<SelectionEvent> {
        let column = self.layout.category_at(x)?;
        let hit = self.layout.segment_at(column.month, x, y)?;
        let month_name = &self.figure.months().get(column.month)?.month_name;
        Some(SelectionEvent::new(hit.product_name.clone(), month_name.clone()))
    }

    /// Handle a mouse event. A left click on a segment yields its selection.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<SelectionEvent> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let column = self.layout.category_at(mouse.column)?;
                let hit = self.layout.segment_at(column.month, mouse.column, mouse.row)?;
                self.cursor = Some((hit.month, hit.segment));
                self.selection_at(mouse.column, mouse.row)
            }
            MouseEventKind::ScrollDown => {
                self.move_month(1);
                None
            }
            MouseEventKind::ScrollUp => {
                self.move_month(-1);
                None
            }
            _ => None,
        }
    }

    /// Handle a key press. Enter or space on the cursor segment yields its selection.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<SelectionEvent> {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.move_month(-1);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.move_month(1);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_segment(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_segment(-1);
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let (month, segment) = self.cursor?;
                self.figure.selection_at(month, segment)
            }
            _ => None,
        }
    }

    fn move_month(&mut self, delta: isize) {
        let Some((month, segment)) = self.cursor else {
            return;
        };
        let last = self.figure.months().len().saturating_sub(1);
        let month = month.saturating_add_signed(delta).min(last);
        let stack_len = self.figure.months()[month].segments.len();
        self.cursor = Some((month, segment.min(stack_len.saturating_sub(1))));
        self.keep_cursor_visible();
    }

    fn move_segment(&mut self, delta: isize) {
        let Some((month, segment)) = self.cursor else {
            return;
        };
        let stack_len = self.figure.months()[month].segments.len();
        let segment = segment
            .saturating_add_signed(delta)
            .min(stack_len.saturating_sub(1));
        self.cursor = Some((month, segment));
    }

    fn keep_cursor_visible(&mut self) {
        let Some((month, _)) = self.cursor else {
            return;
        };
        let visible = self.layout.visible_months().max(1);
        if month < self.first_month {
            self.first_month = month;
        } else if month >= self.first_month + visible {
            self.first_month = month + 1 - visible;
        }
    }

    /// Draw the chart into `area` and remember its geometry for hit testing.
    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(Color::Green))
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.figure.is_empty() {
            self.layout = ChartLayout::default();
            frame.render_widget(
                Paragraph::new("No sales data loaded.").style(Style::default().fg(Color::DarkGray)),
                inner,
            );
            return;
        }

        self.layout = compute_layout(
            self.figure,
            inner,
            self.bar_width,
            self.bar_gap,
            self.first_month,
        );
        self.first_month = self.layout.first_month;
        if self.layout.columns.is_empty() {
            return;
        }

        self.render_legend(frame, inner);
        let buf = frame.buffer_mut();
        self.render_axis(buf);
        self.render_bars(buf);
        self.render_labels(buf);
    }

    fn render_legend(&self, frame: &mut Frame<'_>, inner: Rect) {
        let mut spans = Vec::with_capacity(self.figure.series().len() * 2);
        for series in self.figure.series() {
            spans.push(Span::styled(
                "■ ",
                Style::default().fg(series_color(series.palette_index)),
            ));
            spans.push(Span::raw(format!("{}  ", series.product_name)));
        }
        let legend = Rect {
            height: 1,
            ..inner
        };
        frame.render_widget(Paragraph::new(Line::from(spans)), legend);
    }

    fn render_axis(&self, buf: &mut Buffer) {
        let plot = self.layout.plot;
        let axis_x = plot.x;
        let label_width = usize::from(self.layout.gutter.saturating_sub(1));
        let axis_style = Style::default().fg(Color::DarkGray);

        for y in plot.top()..plot.bottom() {
            if let Some(cell) = buf.cell_mut((axis_x, y)) {
                cell.set_symbol("│").set_style(axis_style);
            }
        }

        let x = plot.x.saturating_sub(self.layout.gutter);
        let top = format_axis_value(self.figure.max_stack_total());
        buf.set_string(x, plot.top(), format!("{top:>label_width$}"), axis_style);
        if plot.height > 1 {
            buf.set_string(
                x,
                plot.bottom() - 1,
                format!("{:>label_width$}", "0"),
                axis_style,
            );
        }
    }

    fn render_bars(&self, buf: &mut Buffer) {
        let months = self.figure.months();
        for hit in &self.layout.segments {
            let series = months[hit.month].segments[hit.segment].series;
            let on_cursor = self.cursor == Some((hit.month, hit.segment));
            let symbol = if on_cursor { CURSOR_SYMBOL } else { BAR_SYMBOL };
            let mut style = Style::default().fg(series_color(series));
            if on_cursor {
                style = style.bg(Color::White);
            }

            for y in hit.rect.top()..hit.rect.bottom() {
                for x in hit.rect.left()..hit.rect.right() {
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        cell.set_symbol(symbol).set_style(style);
                    }
                }
            }
        }
    }

    fn render_labels(&self, buf: &mut Buffer) {
        let plot = self.layout.plot;
        let y = plot.bottom();
        let slot = usize::from(self.layout.bar_width.saturating_add(self.bar_gap));
        let max_chars = slot.saturating_sub(1).max(1);

        for column in &self.layout.columns {
            let label: String = self.figure.months()[column.month]
                .month_name
                .chars()
                .take(max_chars)
                .collect();
            let style = if self.cursor.is_some_and(|(m, _)| m == column.month) {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            buf.set_string(column.x, y, label, style);
        }

        let hidden_left = self.layout.first_month > 0;
        let hidden_right =
            self.layout.first_month + self.layout.visible_months() < self.figure.months().len();
        if hidden_left {
            buf.set_string(plot.x, y, "‹", Style::default().fg(Color::Yellow));
        }
        if hidden_right {
            buf.set_string(plot.right() - 1, y, "›", Style::default().fg(Color::Yellow));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::{Terminal, backend::TestBackend};
    use salesboard_core::aggregate::aggregate;
    use salesboard_core::figure::MonthOrder;
    use salesboard_core::model::SalesRecord;

    fn figure(data: &[(&str, &str, f64)]) -> StackedBarFigure {
        let records: Vec<SalesRecord> = data
            .iter()
            .map(|(p, m, r)| SalesRecord::new(*p, *m, *r))
            .collect();
        StackedBarFigure::build(&aggregate(&records), MonthOrder::Chronological)
    }

    fn sample() -> StackedBarFigure {
        figure(&[
            ("Product A", "Jan 2022", 100.0),
            ("Product A", "Jan 2022", 50.0),
            ("Product B", "Jan 2022", 30.0),
            ("Product A", "Feb 2022", 60.0),
            ("Product B", "Feb 2022", 200.0),
        ])
    }

    fn click(x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn draw(view: &mut ChartView<'_>, width: u16, height: u16) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal
            .draw(|frame| view.render(frame, frame.area()))
            .expect("draw");
        terminal
    }

    fn center(rect: Rect) -> (u16, u16) {
        (rect.x + rect.width / 2, rect.y + rect.height / 2)
    }

    #[test]
    fn layout_has_one_hit_region_per_drawn_segment() {
        let figure = sample();
        let layout = compute_layout(&figure, Rect::new(0, 0, 60, 20), 7, 2, 0);

        assert_eq!(layout.columns.len(), 2);
        assert_eq!(layout.segments.len(), 4);
        assert_eq!(layout.bar_width, 7);

        // Stacks sit on the axis baseline and never overlap.
        for column in &layout.columns {
            let mut rects: Vec<Rect> = layout
                .segments
                .iter()
                .filter(|s| s.month == column.month)
                .map(|s| s.rect)
                .collect();
            rects.sort_by_key(|r| std::cmp::Reverse(r.y));
            assert_eq!(rects[0].bottom(), layout.plot.bottom());
            for pair in rects.windows(2) {
                assert_eq!(pair[1].bottom(), pair[0].top());
            }
        }
    }

    #[test]
    fn tallest_stack_fills_plot_height() {
        let figure = sample();
        let layout = compute_layout(&figure, Rect::new(0, 0, 60, 20), 7, 2, 0);
        let feb_height: u16 = layout
            .segments
            .iter()
            .filter(|s| s.month == 1)
            .map(|s| s.rect.height)
            .sum();
        assert_eq!(feb_height, layout.plot.height);
    }

    #[test]
    fn narrow_area_shrinks_bars_then_windows_months() {
        let months = [
            "Jan 2022", "Feb 2022", "Mar 2022", "Apr 2022", "May 2022", "Jun 2022",
        ];
        let data: Vec<(&str, &str, f64)> = months.iter().map(|m| ("P", *m, 10.0)).collect();
        let figure = figure(&data);

        let layout = compute_layout(&figure, Rect::new(0, 0, 24, 10), 7, 2, 0);
        assert!(layout.bar_width < 7);
        assert!(!layout.columns.is_empty());
        assert!(layout.columns.last().is_some_and(|c| c.x + c.width <= layout.plot.right()));

        let tiny = compute_layout(&figure, Rect::new(0, 0, 8, 10), 7, 2, 4);
        assert_eq!(tiny.bar_width, 1);
        assert!(tiny.visible_months() < months.len());
        assert!(tiny.first_month > 0);
    }

    #[test]
    fn click_on_segment_emits_product_and_month() {
        let figure = sample();
        let mut view = ChartView::new(&figure, "Revenue", 7, 2);
        let _terminal = draw(&mut view, 60, 20);

        let target = view
            .layout()
            .segments
            .iter()
            .find(|s| s.month == 1 && s.product_name == "Product B")
            .cloned()
            .expect("Feb / Product B drawn");
        let (x, y) = center(target.rect);

        let event = view.handle_mouse(click(x, y)).expect("segment clicked");
        assert_eq!(event, SelectionEvent::new("Product B", "Feb 2022"));
        assert_eq!(view.cursor(), Some((target.month, target.segment)));
    }

    #[test]
    fn click_outside_segments_emits_nothing() {
        let figure = sample();
        let mut view = ChartView::new(&figure, "Revenue", 7, 2);
        let _terminal = draw(&mut view, 60, 20);
        let layout = view.layout().clone();

        // Border, legend row, y-axis, label row.
        assert!(view.handle_mouse(click(0, 0)).is_none());
        assert!(view.handle_mouse(click(layout.plot.x + 2, layout.plot.y - 1)).is_none());
        assert!(view.handle_mouse(click(layout.plot.x, layout.plot.bottom() - 1)).is_none());
        assert!(view.handle_mouse(click(layout.columns[0].x, layout.plot.bottom())).is_none());

        // Gap between the two bars.
        let gap_x = layout.columns[0].x + layout.columns[0].width;
        assert!(view.handle_mouse(click(gap_x, layout.plot.bottom() - 1)).is_none());

        // Empty space above the shorter January stack.
        let jan_top = layout
            .segments
            .iter()
            .filter(|s| s.month == 0)
            .map(|s| s.rect.top())
            .min()
            .expect("january drawn");
        assert!(jan_top > layout.plot.top());
        assert!(view.handle_mouse(click(layout.columns[0].x, layout.plot.top())).is_none());
    }

    #[test]
    fn every_drawn_segment_maps_back_to_its_pair() {
        let figure = sample();
        let mut view = ChartView::new(&figure, "Revenue", 7, 2);
        let _terminal = draw(&mut view, 60, 20);

        for hit in view.layout().segments.clone() {
            let (x, y) = center(hit.rect);
            let event = view.selection_at(x, y).expect("hit");
            assert_eq!(Some(event), figure.selection_at(hit.month, hit.segment));
        }
    }

    #[test]
    fn keyboard_cursor_moves_and_selects() {
        let figure = sample();
        let mut view = ChartView::new(&figure, "Revenue", 7, 2);
        assert_eq!(view.cursor(), Some((0, 0)));

        assert!(view.handle_key(KeyEvent::from(KeyCode::Up)).is_none());
        assert_eq!(view.cursor(), Some((0, 1)));
        assert!(view.handle_key(KeyEvent::from(KeyCode::Up)).is_none());
        assert_eq!(view.cursor(), Some((0, 1)));

        view.handle_key(KeyEvent::from(KeyCode::Right));
        view.handle_key(KeyEvent::from(KeyCode::Right));
        assert_eq!(view.cursor(), Some((1, 1)));

        view.handle_key(KeyEvent::from(KeyCode::Char('j')));
        let event = view.handle_key(KeyEvent::from(KeyCode::Enter));
        assert_eq!(event, Some(SelectionEvent::new("Product A", "Feb 2022")));
    }

    #[test]
    fn empty_figure_has_no_cursor_and_no_hits() {
        let figure = StackedBarFigure::default();
        let mut view = ChartView::new(&figure, "Revenue", 7, 2);
        let terminal = draw(&mut view, 40, 10);

        assert!(view.cursor().is_none());
        assert!(view.handle_key(KeyEvent::from(KeyCode::Enter)).is_none());
        assert!(view.handle_mouse(click(10, 5)).is_none());

        let buffer = terminal.backend().buffer();
        let row: String = (1..39).map(|x| buffer[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("No sales data loaded."));
    }

    #[test]
    fn render_draws_legend_labels_and_bars() {
        let figure = sample();
        let mut view = ChartView::new(&figure, "Revenue", 7, 2);
        let terminal = draw(&mut view, 60, 20);
        let buffer = terminal.backend().buffer();
        let layout = view.layout();

        let legend: String = (1..59).map(|x| buffer[(x, 1)].symbol().to_string()).collect();
        assert!(legend.contains("Product A"));
        assert!(legend.contains("Product B"));

        let label_y = layout.plot.bottom();
        let labels: String = (1..59)
            .map(|x| buffer[(x, label_y)].symbol().to_string())
            .collect();
        assert!(labels.contains("Jan 202"));
        assert!(labels.contains("Feb 202"));

        let bar = layout
            .segments
            .iter()
            .find(|s| s.month == 1 && s.segment == 1)
            .expect("Feb / Product B drawn");
        let cell = &buffer[(bar.rect.x, bar.rect.y)];
        assert_eq!(cell.symbol(), BAR_SYMBOL);
        assert_eq!(cell.fg, series_color(1));
    }

    #[test]
    fn oversized_gap_from_config_still_renders() {
        let figure = figure(&[("Product A", "Jan 2022", 10.0)]);
        let mut view = ChartView::new(&figure, "Revenue", 7, u16::MAX);
        let terminal = draw(&mut view, 60, 20);
        let layout = view.layout();

        assert_eq!(layout.columns.len(), 1);
        assert_eq!(layout.bar_width, 1);

        let buffer = terminal.backend().buffer();
        let labels: String = (1..59)
            .map(|x| buffer[(x, layout.plot.bottom())].symbol().to_string())
            .collect();
        assert!(labels.contains("Jan 2022"));

        let hit = layout.segments[0].rect;
        assert_eq!(
            view.selection_at(hit.x, hit.y),
            Some(SelectionEvent::new("Product A", "Jan 2022"))
        );
    }

    #[test]
    fn axis_values_are_compact() {
        assert_eq!(format_axis_value(950.0), "950");
        assert_eq!(format_axis_value(47_463.0), "47.5k");
        assert_eq!(format_axis_value(1_250_000.0), "1.2M");
    }
}
