pub mod config;
pub mod error;
pub mod key;
pub mod normalize;
pub mod schema;
pub mod types;

pub use crate::config::{LinkageConfig, Stage};
pub use error::{LinkageError, LinkageResult};
pub use key::{GroupingKey, KeyValue};
pub use schema::{Column, Dimension, Metric, ReportKind};
pub use types::{safe_div, MetricRow, MetricTable, Metrics, Ratios};
