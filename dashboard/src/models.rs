//! View models assembled for the presentation layer.
//!
//! All upstream-decoded structs are lenient: every field has a default, so a
//! missing or null field yields the type's default value instead of a decode
//! failure. The backend API has emitted both camelCase and PascalCase field
//! names over time, so each field carries a PascalCase alias next to its
//! camelCase wire name.

use serde::{Deserialize, Serialize};

/// Base dashboard counters returned by `api/dashboard/summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SummaryStats {
    #[serde(alias = "TotalRequests")]
    pub total_requests: u64,
    #[serde(alias = "AnomalyCount")]
    pub anomaly_count: u64,
    #[serde(alias = "BlockedCount")]
    pub blocked_count: u64,
    #[serde(alias = "DistinctSources")]
    pub distinct_sources: u64,
    #[serde(alias = "AvgErrorRatio")]
    pub avg_error_ratio: f64,
}

/// One ranked entry from `api/anomaly/top-suspicious`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuspiciousIp {
    #[serde(alias = "IpAddress")]
    pub ip_address: String,
    #[serde(alias = "Score")]
    pub score: f64,
    #[serde(alias = "Requests")]
    pub requests: u64,
    #[serde(alias = "FailCount")]
    pub fail_count: u64,
    #[serde(alias = "ErrorRatio")]
    pub error_ratio: f64,
    #[serde(alias = "DistinctUsers")]
    pub distinct_users: u64,
}

/// One per-minute bucket from `api/anomaly/series`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesPoint {
    #[serde(alias = "MinuteUtc")]
    pub minute_utc: String,
    #[serde(alias = "Count")]
    pub count: u64,
}

/// One per-minute bucket from `api/anomaly/blocked-series`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockedPoint {
    #[serde(alias = "MinuteUtc")]
    pub minute_utc: String,
    #[serde(alias = "Blocked")]
    pub blocked: u64,
}

/// One ranked entry from `api/anomaly/blocked-top`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockedIp {
    #[serde(alias = "IpAddress")]
    pub ip_address: String,
    #[serde(alias = "Blocked")]
    pub blocked: u64,
    #[serde(alias = "LastSeenUtc")]
    pub last_seen_utc: String,
}

/// Per-address detail returned by `api/anomaly/ip/{ip}`.
///
/// The `ip` field is overwritten with the requested identifier after decoding
/// so the presentation layer always has a key, even for an empty payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IpDetail {
    #[serde(alias = "Ip")]
    pub ip: String,
    #[serde(alias = "Requests")]
    pub requests: u64,
    #[serde(alias = "SuccessCount")]
    pub success_count: u64,
    #[serde(alias = "FailCount")]
    pub fail_count: u64,
    #[serde(alias = "ErrorRatio")]
    pub error_ratio: f64,
    #[serde(alias = "AvgInterRequestMs")]
    pub avg_inter_request_ms: f64,
    #[serde(alias = "DistinctUsers")]
    pub distinct_users: u64,
    #[serde(alias = "Score")]
    pub score: f64,
    #[serde(alias = "IsAnomaly")]
    pub is_anomaly: bool,
    #[serde(alias = "Series")]
    pub series: Vec<SeriesPoint>,
}

/// The composite dashboard model: one base summary plus four independently
/// sourced list fields. List fields are empty, never absent, when their
/// source call fails or returns nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardView {
    pub summary: SummaryStats,
    pub top_suspicious: Vec<SuspiciousIp>,
    pub series: Vec<SeriesPoint>,
    pub blocked_series: Vec<BlockedPoint>,
    pub blocked_top: Vec<BlockedIp>,
}
