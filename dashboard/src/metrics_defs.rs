//! Metrics definitions for the dashboard gateway.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

pub const UPSTREAM_REQUESTS: MetricDef = MetricDef {
    name: "upstream.requests",
    metric_type: MetricType::Counter,
    description: "Number of GET requests issued to the backend API",
};

pub const UPSTREAM_FAILURES: MetricDef = MetricDef {
    name: "upstream.failures",
    metric_type: MetricType::Counter,
    description: "Upstream calls that returned a non-success status, timed out, or produced an unparseable body",
};

pub const DEGRADED_FIELDS: MetricDef = MetricDef {
    name: "dashboard.degraded_fields",
    metric_type: MetricType::Counter,
    description: "Composite fields left at their empty default because their source call failed",
};

pub const UNAUTHENTICATED_REQUESTS: MetricDef = MetricDef {
    name: "gate.unauthenticated",
    metric_type: MetricType::Counter,
    description: "Requests rejected by the credential gate before any upstream call",
};

// TODO: all metrics must be added here for now, this can be done dynamically with a macro in the future.
pub const ALL_METRICS: &[MetricDef] = &[
    UPSTREAM_REQUESTS,
    UPSTREAM_FAILURES,
    DEGRADED_FIELDS,
    UNAUTHENTICATED_REQUESTS,
];
