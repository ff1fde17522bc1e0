//! In-memory derivation layer for the project and client-metrics dashboards:
//! ingestion of delimited uploads, filtering, sorting, aggregation,
//! bucketing, time series and comparisons, all recomputed from immutable
//! snapshots.

pub mod compare;
pub mod config;
pub mod distribution;
pub mod filters;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod report;
pub mod sort;
pub mod state;
pub mod summary;
pub mod timeline;

#[cfg(test)]
mod test_support;
