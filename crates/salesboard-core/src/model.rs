//! Record types shared by the store, the aggregator and the drill-down.

/// Header of the product column in the source CSV.
pub const PRODUCT_COLUMN: &str = "Product Name";
/// Header of the month column in the source CSV.
pub const MONTH_COLUMN: &str = "Month Name";
/// Header of the revenue column in the source CSV.
pub const REVENUE_COLUMN: &str = "Revenue";

/// Columns every source must provide.
pub const REQUIRED_COLUMNS: [&str; 3] = [PRODUCT_COLUMN, MONTH_COLUMN, REVENUE_COLUMN];

/// One raw row of sales data.
///
/// `values` holds every cell of the source row, aligned with
/// [`DataStore::columns`](crate::store::DataStore::columns), so detail views
/// can show fields beyond the three the aggregation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub product_name: String,
    pub month_name: String,
    pub revenue: f64,
    pub values: Vec<String>,
}

impl SalesRecord {
    /// Build a record carrying only the three required fields.
    ///
    /// The raw values follow [`REQUIRED_COLUMNS`] order.
    pub fn new(product_name: impl Into<String>, month_name: impl Into<String>, revenue: f64) -> Self {
        let product_name = product_name.into();
        let month_name = month_name.into();
        let values = vec![
            product_name.clone(),
            month_name.clone(),
            format_revenue(revenue),
        ];
        Self {
            product_name,
            month_name,
            revenue,
            values,
        }
    }

    /// Returns true if this record belongs to the given (product, month) group.
    #[must_use]
    pub fn matches(&self, product_name: &str, month_name: &str) -> bool {
        self.product_name == product_name && self.month_name == month_name
    }
}

/// Render a revenue amount without a trailing `.0` for whole numbers.
#[must_use]
pub fn format_revenue(revenue: f64) -> String {
    if revenue.fract() == 0.0 && revenue.abs() < 1e15 {
        format!("{revenue:.0}")
    } else {
        format!("{revenue}")
    }
}
