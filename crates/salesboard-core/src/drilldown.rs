//! Drill-down from a chart selection to the raw records behind it.
//!
//! [`DrillDown`] is the listener the chart feeds. It starts in
//! [`DrillState::Empty`]; every real selection replaces the current table with
//! a fresh [`DrillTable`], while an absent selection leaves everything as is.

use crate::model::SalesRecord;
use crate::selection::{SelectionEvent, SelectionListener};
use crate::store::DataStore;
use serde::Serialize;
use tracing::{debug, info};

/// Records matching both the product and the month of `event`, in store order.
#[must_use]
pub fn filter_records<'a>(store: &'a DataStore, event: &SelectionEvent) -> Vec<&'a SalesRecord> {
    store
        .records()
        .iter()
        .filter(|record| record.matches(&event.product_name, &event.month_name))
        .collect()
}

/// A rendered drill-down: the full column set and the matching rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillTable {
    pub selection: SelectionEvent,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub revenue_total: f64,
}

impl DrillTable {
    /// Filter `store` by `event`. An empty match is a valid zero-row table.
    #[must_use]
    pub fn build(store: &DataStore, event: &SelectionEvent) -> Self {
        let matched = filter_records(store, event);
        let revenue_total = matched.iter().map(|r| r.revenue).sum();
        Self {
            selection: event.clone(),
            columns: store.columns().to_vec(),
            rows: matched.into_iter().map(|r| r.values.clone()).collect(),
            revenue_total,
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrillState {
    /// Nothing selected yet; no table is shown.
    Empty,
    /// The table for the most recent selection.
    Showing(DrillTable),
}

/// Drill-down state machine bound to a loaded store.
#[derive(Debug)]
pub struct DrillDown<'a> {
    store: &'a DataStore,
    state: DrillState,
    generation: u64,
}

impl<'a> DrillDown<'a> {
    #[must_use]
    pub const fn new(store: &'a DataStore) -> Self {
        Self {
            store,
            state: DrillState::Empty,
            generation: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &DrillState {
        &self.state
    }

    /// The table currently shown, if any.
    #[must_use]
    pub const fn table(&self) -> Option<&DrillTable> {
        match &self.state {
            DrillState::Empty => None,
            DrillState::Showing(table) => Some(table),
        }
    }

    /// Number of tables rendered so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

impl SelectionListener for DrillDown<'_> {
    fn on_selection(&mut self, event: Option<&SelectionEvent>) -> bool {
        let Some(event) = event else {
            debug!("ignoring absent selection");
            return false;
        };

        let table = DrillTable::build(self.store, event);
        info!(
            product = %event.product_name,
            month = %event.month_name,
            rows = table.row_count(),
            "drill-down selection"
        );
        self.state = DrillState::Showing(table);
        self.generation += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DataStore {
        DataStore::from_basic_records(vec![
            SalesRecord::new("Product A", "Jan 2022", 100.0),
            SalesRecord::new("Product A", "Jan 2022", 50.0),
            SalesRecord::new("Product B", "Jan 2022", 30.0),
            SalesRecord::new("Product A", "Feb 2022", 10.0),
        ])
    }

    #[test]
    fn filter_matches_both_fields() {
        let store = store();
        let matched = filter_records(&store, &SelectionEvent::new("Product A", "Jan 2022"));
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|r| r.matches("Product A", "Jan 2022")));
        assert!((matched[0].revenue - 100.0).abs() < f64::EPSILON);
        assert!((matched[1].revenue - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn starts_empty() {
        let store = store();
        let drill = DrillDown::new(&store);
        assert_eq!(drill.state(), &DrillState::Empty);
        assert!(drill.table().is_none());
        assert_eq!(drill.generation(), 0);
    }

    #[test]
    fn selection_shows_matching_rows() {
        let store = store();
        let mut drill = DrillDown::new(&store);

        assert!(drill.on_selection(Some(&SelectionEvent::new("Product A", "Jan 2022"))));
        let table = drill.table().expect("table shown");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns, vec!["Product Name", "Month Name", "Revenue"]);
        assert_eq!(table.rows[0], vec!["Product A", "Jan 2022", "100"]);
        assert!((table.revenue_total - 150.0).abs() < f64::EPSILON);
        assert_eq!(drill.generation(), 1);
    }

    #[test]
    fn new_selection_replaces_previous_table() {
        let store = store();
        let mut drill = DrillDown::new(&store);

        drill.on_selection(Some(&SelectionEvent::new("Product A", "Jan 2022")));
        drill.on_selection(Some(&SelectionEvent::new("Product B", "Jan 2022")));

        let table = drill.table().expect("table shown");
        assert_eq!(table.selection, SelectionEvent::new("Product B", "Jan 2022"));
        assert_eq!(table.row_count(), 1);
        assert_eq!(drill.generation(), 2);
    }

    #[test]
    fn absent_selection_is_a_no_op() {
        let store = store();
        let mut drill = DrillDown::new(&store);

        assert!(!drill.on_selection(None));
        assert_eq!(drill.state(), &DrillState::Empty);
        assert_eq!(drill.generation(), 0);

        drill.on_selection(Some(&SelectionEvent::new("Product A", "Feb 2022")));
        let before = drill.state().clone();

        assert!(!drill.on_selection(None));
        assert_eq!(drill.state(), &before);
        assert_eq!(drill.generation(), 1);
    }

    #[test]
    fn unmatched_selection_renders_empty_table() {
        let store = store();
        let mut drill = DrillDown::new(&store);

        assert!(drill.on_selection(Some(&SelectionEvent::new("Product Z", "Jan 2022"))));
        let table = drill.table().expect("table shown");
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 3);
        assert!(table.revenue_total.abs() < f64::EPSILON);
    }
}
