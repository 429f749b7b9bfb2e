//! Payment intelligence: heuristic metrics over a transaction store,
//! narrated by an external text generator and served over HTTP.

pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod global_context;
pub mod metric_aggregator;
pub mod narrative;
pub mod risk_scorer;
pub mod rng;
pub mod store;
pub mod synthetic;
pub mod types;
