//! Revenue aggregation by (product, month).

use crate::model::SalesRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Summed revenue for one (product, month) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub product_name: String,
    pub month_name: String,
    pub revenue_sum: f64,
    /// Number of raw records folded into this row.
    pub record_count: usize,
}

/// Group `records` by (product, month) and sum revenue within each group.
///
/// Only groups present in the input are produced. Rows come back ordered by
/// product then month, so the output is deterministic for a given input.
#[must_use]
pub fn aggregate(records: &[SalesRecord]) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = groups
            .entry((record.product_name.as_str(), record.month_name.as_str()))
            .or_insert((0.0, 0));
        entry.0 += record.revenue;
        entry.1 += 1;
    }

    let rows: Vec<AggregateRow> = groups
        .into_iter()
        .map(|((product, month), (revenue_sum, record_count))| AggregateRow {
            product_name: product.to_string(),
            month_name: month.to_string(),
            revenue_sum,
            record_count,
        })
        .collect();

    tracing::debug!(
        records = records.len(),
        groups = rows.len(),
        "aggregated revenue by product and month"
    );
    rows
}

/// Sum of `revenue_sum` over all rows.
#[must_use]
pub fn total_revenue(rows: &[AggregateRow]) -> f64 {
    rows.iter().map(|row| row.revenue_sum).sum()
}
