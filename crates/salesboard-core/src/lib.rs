//! salesboard-core library.
//!
//! Load sales records, aggregate revenue by (product, month), model the
//! stacked bar chart, and drill down from a chart selection to the raw rows.
//!
//! # Conventions
//!
//! - **Errors**: fallible operations return [`error::Result`]; every error
//!   carries a stable [`error::ErrorCode`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod aggregate;
pub mod config;
pub mod drilldown;
pub mod error;
pub mod figure;
pub mod model;
pub mod selection;
pub mod store;

pub use error::{Error, ErrorCode, Result};
