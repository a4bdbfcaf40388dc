//! Chart model for the stacked revenue bar chart.
//!
//! A [`StackedBarFigure`] is built once from the aggregate rows: months become
//! horizontal-axis categories, products become coloured series, and every
//! aggregate row becomes one segment in its month's stack. Views only read it.

use crate::aggregate::AggregateRow;
use crate::selection::SelectionEvent;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// How month categories are ordered along the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthOrder {
    /// Calendar order for labels like `Mar 2022`; other labels follow, sorted.
    #[default]
    Chronological,
    /// Plain string order.
    Lexical,
    /// Order of first appearance in the aggregate rows.
    Appearance,
}

/// A product series: one colour, one legend entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub product_name: String,
    pub palette_index: usize,
}

/// One bar segment. `product_name` is the identifier attached to the segment.
#[derive(Debug, Clone, PartialEq)]
pub struct StackSegment {
    pub product_name: String,
    pub series: usize,
    pub value: f64,
}

/// All segments drawn for one month category, bottom to top.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthStack {
    pub month_name: String,
    pub segments: Vec<StackSegment>,
}

impl MonthStack {
    /// Height of the stack; non-positive segments contribute nothing.
    #[must_use]
    pub fn positive_total(&self) -> f64 {
        self.segments.iter().map(|s| s.value.max(0.0)).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackedBarFigure {
    months: Vec<MonthStack>,
    series: Vec<Series>,
}

/// Parse a `Mar 2022` style label into the first day of that month.
#[must_use]
pub fn parse_month_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("01 {}", label.trim()), "%d %b %Y").ok()
}

fn order_months(rows: &[AggregateRow], order: MonthOrder) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut months: Vec<String> = rows
        .iter()
        .filter(|row| seen.insert(row.month_name.as_str()))
        .map(|row| row.month_name.clone())
        .collect();

    match order {
        MonthOrder::Appearance => {}
        MonthOrder::Lexical => months.sort(),
        MonthOrder::Chronological => months.sort_by_cached_key(|label| {
            let date = parse_month_label(label);
            (date.is_none(), date, label.clone())
        }),
    }
    months
}

impl StackedBarFigure {
    /// Build the figure from aggregate rows.
    #[must_use]
    pub fn build(rows: &[AggregateRow], order: MonthOrder) -> Self {
        let series: Vec<Series> = rows
            .iter()
            .map(|row| row.product_name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(palette_index, product)| Series {
                product_name: product.to_string(),
                palette_index,
            })
            .collect();

        let months = order_months(rows, order)
            .into_iter()
            .map(|month_name| {
                let mut segments: Vec<StackSegment> = rows
                    .iter()
                    .filter(|row| row.month_name == month_name)
                    .filter_map(|row| {
                        let idx = series
                            .iter()
                            .position(|s| s.product_name == row.product_name)?;
                        Some(StackSegment {
                            product_name: row.product_name.clone(),
                            series: idx,
                            value: row.revenue_sum,
                        })
                    })
                    .collect();
                segments.sort_by_key(|s| s.series);
                MonthStack {
                    month_name,
                    segments,
                }
            })
            .collect();

        Self { months, series }
    }

    /// Month categories in axis order.
    #[must_use]
    pub fn months(&self) -> &[MonthStack] {
        &self.months
    }

    /// Product series in legend order.
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Number of segments across all stacks.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.months.iter().map(|m| m.segments.len()).sum()
    }

    /// Largest stack height, used to scale the vertical axis.
    #[must_use]
    pub fn max_stack_total(&self) -> f64 {
        self.months
            .iter()
            .map(MonthStack::positive_total)
            .fold(0.0, f64::max)
    }

    /// Index of the month category with the given label.
    #[must_use]
    pub fn month_index(&self, month_name: &str) -> Option<usize> {
        self.months.iter().position(|m| m.month_name == month_name)
    }

    /// The selection a click on segment `segment` of month `month` produces.
    #[must_use]
    pub fn selection_at(&self, month: usize, segment: usize) -> Option<SelectionEvent> {
        let stack = self.months.get(month)?;
        let seg = stack.segments.get(segment)?;
        Some(SelectionEvent::new(
            seg.product_name.clone(),
            stack.month_name.clone(),
        ))
    }
}
