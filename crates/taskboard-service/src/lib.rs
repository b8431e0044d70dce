pub mod aggregation;
pub mod models;
pub mod ordering;
pub mod service;

pub use aggregation::AggregationEngine;
pub use ordering::OrderingEngine;
pub use service::{ServiceSettings, TaskboardService};

#[cfg(test)]
pub(crate) mod test_support;
