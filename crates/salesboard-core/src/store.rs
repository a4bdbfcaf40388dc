//! In-memory sales record store.
//!
//! The store is loaded once at startup and is read-only afterwards. Loading is
//! all-or-nothing: a missing source, a missing required column, a ragged row or
//! an unparseable revenue value fails the whole load.

use crate::error::{Error, Result};
use crate::model::{MONTH_COLUMN, PRODUCT_COLUMN, REQUIRED_COLUMNS, REVENUE_COLUMN, SalesRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Read-only, ordered set of sales records plus the source column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataStore {
    columns: Vec<String>,
    records: Vec<SalesRecord>,
}

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    product: usize,
    month: usize,
    revenue: usize,
}

impl ColumnIndex {
    fn resolve(columns: &[String]) -> Result<Self> {
        let find = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| Error::MissingColumn {
                    column: name.to_string(),
                })
        };

        Ok(Self {
            product: find(PRODUCT_COLUMN)?,
            month: find(MONTH_COLUMN)?,
            revenue: find(REVENUE_COLUMN)?,
        })
    }
}

impl DataStore {
    /// Load a store from a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceMissing`] if `path` does not exist,
    /// [`Error::Io`] if it cannot be opened, and the errors of
    /// [`DataStore::from_reader`] for malformed content.
    pub fn load_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::SourceMissing {
                path: path.to_path_buf(),
            });
        }

        info!(path = %path.display(), "loading sales data");
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self::from_reader(BufReader::new(file))?;
        info!(
            records = store.len(),
            columns = store.columns.len(),
            "sales data loaded"
        );
        Ok(store)
    }

    /// Load a store from CSV text read from `reader`.
    ///
    /// Cells are trimmed of surrounding whitespace. A header with no data rows
    /// yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Csv`] for unreadable or ragged rows,
    /// [`Error::MissingColumn`] when a required header is absent, and
    /// [`Error::InvalidRevenue`] when a revenue cell is not a finite number.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()
            .map_err(Error::from_csv)?
            .iter()
            .map(str::to_string)
            .collect();
        let index = ColumnIndex::resolve(&columns)?;
        debug!(?columns, "resolved CSV header");

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row.map_err(Error::from_csv)?;
            let line = row.position().map_or(0, csv::Position::line);
            let raw_revenue = &row[index.revenue];
            let revenue = raw_revenue
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| Error::InvalidRevenue {
                    line,
                    value: raw_revenue.to_string(),
                })?;

            records.push(SalesRecord {
                product_name: row[index.product].to_string(),
                month_name: row[index.month].to_string(),
                revenue,
                values: row.iter().map(str::to_string).collect(),
            });
        }

        Ok(Self { columns, records })
    }

    /// Build a store from records assembled in memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] when `columns` lacks a required
    /// column and [`Error::RecordWidth`] when a record's raw values do not
    /// line up with `columns`.
    pub fn from_records(columns: Vec<String>, records: Vec<SalesRecord>) -> Result<Self> {
        ColumnIndex::resolve(&columns)?;
        if let Some((index, record)) = records
            .iter()
            .enumerate()
            .find(|(_, record)| record.values.len() != columns.len())
        {
            return Err(Error::RecordWidth {
                index,
                expected: columns.len(),
                found: record.values.len(),
            });
        }
        Ok(Self { columns, records })
    }

    /// Build a store from records created with [`SalesRecord::new`].
    #[must_use]
    pub fn from_basic_records(records: Vec<SalesRecord>) -> Self {
        Self {
            columns: REQUIRED_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            records,
        }
    }

    /// Column names in source order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All records in source order.
    #[must_use]
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::io::Write;

    const SAMPLE: &str = "\
Order ID,Product Name,Month Name,Units,Revenue
1001,Product 1,Jan 2022,3,300
1002,Product 2,Jan 2022,1,120.5
1003, Product 1 ,Feb 2022,2,200
";

    #[test]
    fn loads_all_columns_and_records() {
        let store = DataStore::from_reader(SAMPLE.as_bytes()).expect("load");
        assert_eq!(
            store.columns(),
            ["Order ID", "Product Name", "Month Name", "Units", "Revenue"]
        );
        assert_eq!(store.len(), 3);

        let first = &store.records()[0];
        assert_eq!(first.product_name, "Product 1");
        assert_eq!(first.month_name, "Jan 2022");
        assert!((first.revenue - 300.0).abs() < f64::EPSILON);
        assert_eq!(first.values, vec!["1001", "Product 1", "Jan 2022", "3", "300"]);
    }

    #[test]
    fn trims_cells() {
        let store = DataStore::from_reader(SAMPLE.as_bytes()).expect("load");
        assert_eq!(store.records()[2].product_name, "Product 1");
    }

    #[test]
    fn header_only_source_is_empty_store() {
        let store =
            DataStore::from_reader("Product Name,Month Name,Revenue\n".as_bytes()).expect("load");
        assert!(store.is_empty());
        assert_eq!(store.columns().len(), 3);
    }

    #[test]
    fn missing_required_column_fails() {
        let err = DataStore::from_reader("Product Name,Revenue\nA,1\n".as_bytes())
            .expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::MissingColumn);
        assert!(err.to_string().contains("Month Name"));
    }

    #[test]
    fn invalid_revenue_fails_whole_load() {
        let csv = "Product Name,Month Name,Revenue\nA,Jan 2022,10\nB,Jan 2022,lots\n";
        let err = DataStore::from_reader(csv.as_bytes()).expect_err("must fail");
        match err {
            Error::InvalidRevenue { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_revenue_is_rejected() {
        let csv = "Product Name,Month Name,Revenue\nA,Jan 2022,NaN\n";
        let err = DataStore::from_reader(csv.as_bytes()).expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRevenue);
    }

    #[test]
    fn ragged_row_fails() {
        let csv = "Product Name,Month Name,Revenue\nA,Jan 2022\n";
        let err = DataStore::from_reader(csv.as_bytes()).expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::MalformedRecord);
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = DataStore::load_csv(&dir.path().join("nope.csv")).expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::SourceMissing);
    }

    #[test]
    fn load_csv_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sales.csv");
        let mut file = File::create(&path).expect("create");
        file.write_all(SAMPLE.as_bytes()).expect("write");
        drop(file);

        let store = DataStore::load_csv(&path).expect("load");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn from_records_requires_columns() {
        let err = DataStore::from_records(vec!["Product Name".into()], vec![])
            .expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::MissingColumn);
    }

    #[test]
    fn from_records_rejects_misaligned_values() {
        let columns: Vec<String> = ["Order ID", "Product Name", "Month Name", "Revenue"]
            .into_iter()
            .map(str::to_string)
            .collect();
        let short = SalesRecord::new("Product 1", "Jan 2022", 10.0);

        let err = DataStore::from_records(columns.clone(), vec![short.clone()])
            .expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::MalformedRecord);
        assert_eq!(
            err.to_string(),
            "record 0 has 3 fields but the header has 4"
        );

        let mut aligned = short;
        aligned.values.insert(0, "1001".into());
        let store = DataStore::from_records(columns, vec![aligned]).expect("aligned");
        assert_eq!(store.len(), 1);
    }
}
