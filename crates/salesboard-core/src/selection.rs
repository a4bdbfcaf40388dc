//! Selection events emitted by the chart and the listener that consumes them.

use crate::aggregate::AggregateRow;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which bar segment the user picked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionEvent {
    pub product_name: String,
    pub month_name: String,
}

impl SelectionEvent {
    pub fn new(product_name: impl Into<String>, month_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            month_name: month_name.into(),
        }
    }

    /// The selection that identifies `row`'s segment.
    #[must_use]
    pub fn for_row(row: &AggregateRow) -> Self {
        Self::new(row.product_name.clone(), row.month_name.clone())
    }

    /// Read a selection from a chart click payload.
    ///
    /// The payload has the shape
    /// `{"points": [{"x": "Mar 2022", "customdata": ["Product 3"], ...}]}`.
    /// The month comes from the first point's axis category and the product
    /// from its attached custom data. Returns `None` when any of those is
    /// missing or not a string.
    #[must_use]
    pub fn from_click_payload(payload: &Value) -> Option<Self> {
        let point = payload.get("points")?.get(0)?;
        let month_name = point.get("x")?.as_str()?;
        let product_name = point.get("customdata")?.get(0)?.as_str()?;
        Some(Self::new(product_name, month_name))
    }
}

/// Receives chart selections.
///
/// `None` stands for an interaction callback that fired without a real
/// segment behind it. Implementations must treat it as a no-op.
pub trait SelectionListener {
    /// Handle one selection. Returns true if the displayed state changed.
    fn on_selection(&mut self, event: Option<&SelectionEvent>) -> bool;
}
