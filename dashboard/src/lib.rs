//! Backend-for-frontend aggregation for the anomaly dashboard.
//!
//! Sits between the presentation layer and the backend analytics API: each
//! inbound view request passes the credential gate, fans out to a fixed set
//! of upstream reads, and collapses their results into one composite model
//! that tolerates partial upstream failure.

pub mod aggregator;
pub mod api;
pub mod auth;
pub mod client;
pub mod detail;
pub mod errors;
pub mod metrics_defs;
pub mod models;

#[cfg(test)]
pub(crate) mod testutils;
