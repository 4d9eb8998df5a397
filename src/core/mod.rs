//! Core business logic: loading, filtering and aggregating retailer data

pub mod cache;
pub mod config;
pub mod dataset;
pub mod filter;
pub mod log;
pub mod metrics;
pub mod record;
pub mod table;
pub mod tiers;

// Re-export main types for cleaner imports
pub use dataset::{Dataset, LoadError};
pub use filter::{FilterArgs, FilterSelection};
pub use metrics::{CAPTURE_RATE, MetricsBundle};
pub use record::{BnplType, RetailerRecord};
pub use table::{CountryIndex, Matrix, Series};
