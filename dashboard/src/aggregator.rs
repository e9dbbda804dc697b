//! Fan-out aggregation for the dashboard view.
//!
//! One inbound request fans out to five independent upstream GETs and merges
//! their results into a single [`DashboardView`]:
//!
//! 1. `api/dashboard/summary` — the base counters. If this call fails or its
//!    body is unparseable there is no base to attach anything to, so the
//!    whole composite is absent (`None`). The four auxiliary calls are still
//!    issued and their results discarded; they run concurrently with the
//!    base call, so skipping them would not save wall time.
//! 2. `api/anomaly/top-suspicious` — ranked suspicious addresses.
//! 3. `api/anomaly/series` — per-minute activity buckets.
//! 4. `api/anomaly/blocked-series` — per-minute blocked buckets.
//! 5. `api/anomaly/blocked-top` — ranked blocked addresses.
//!
//! Calls 2-5 are each best-effort: a failed or malformed response leaves its
//! field at the empty default without affecting any other field. The merge
//! happens once, after all five calls resolve, and every call feeds exactly
//! one field, so no field ever has more than one writer.

use crate::client::{FetchError, UpstreamClient};
use crate::metrics_defs::DEGRADED_FIELDS;
use crate::models::{BlockedIp, BlockedPoint, DashboardView, SeriesPoint, SummaryStats, SuspiciousIp};

pub const DEFAULT_WINDOW_MINUTES: u32 = 60;
pub const DEFAULT_TOP_N: u32 = 10;

/// Lookback horizon in minutes for time-series and ranking queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow(u32);

impl TimeWindow {
    pub fn new(minutes: Option<u32>) -> Self {
        minutes.map(TimeWindow).unwrap_or_default()
    }

    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow(DEFAULT_WINDOW_MINUTES)
    }
}

/// Cap on ranked-list sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopN(u32);

impl TopN {
    pub fn new(take: Option<u32>) -> Self {
        take.map(TopN).unwrap_or_default()
    }

    pub fn take(self) -> u32 {
        self.0
    }
}

impl Default for TopN {
    fn default() -> Self {
        TopN(DEFAULT_TOP_N)
    }
}

/// Fetch and merge the composite dashboard model.
///
/// Returns `None` only when the base summary call fails; auxiliary failures
/// degrade their own field to an empty list.
pub async fn fetch_dashboard(
    client: &UpstreamClient,
    window: TimeWindow,
    top_n: TopN,
) -> Option<DashboardView> {
    let minutes = window.minutes().to_string();
    let take = top_n.take().to_string();

    let suspicious_params = [("minutes", minutes.clone()), ("take", take.clone())];
    let series_params = [("minutes", minutes.clone())];
    let blocked_series_params = [("minutes", minutes.clone())];
    let blocked_top_params = [("minutes", minutes), ("take", take)];

    let (summary, top_suspicious, series, blocked_series, blocked_top) = tokio::join!(
        client.get_json::<SummaryStats>("api/dashboard/summary", &[]),
        client.get_json::<Vec<SuspiciousIp>>("api/anomaly/top-suspicious", &suspicious_params),
        client.get_json::<Vec<SeriesPoint>>("api/anomaly/series", &series_params),
        client.get_json::<Vec<BlockedPoint>>("api/anomaly/blocked-series", &blocked_series_params),
        client.get_json::<Vec<BlockedIp>>("api/anomaly/blocked-top", &blocked_top_params),
    );

    let summary = match summary {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(error = %e, "base summary unavailable, returning empty composite");
            return None;
        }
    };

    Some(DashboardView {
        summary,
        top_suspicious: list_or_empty(top_suspicious, "top-suspicious"),
        series: list_or_empty(series, "series"),
        blocked_series: list_or_empty(blocked_series, "blocked-series"),
        blocked_top: list_or_empty(blocked_top, "blocked-top"),
    })
}

/// Degrade one auxiliary result to its empty default on failure.
fn list_or_empty<T>(result: Result<Vec<T>, FetchError>, endpoint: &'static str) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            metrics::counter!(DEGRADED_FIELDS.name).increment(1);
            tracing::warn!(endpoint, error = %e, "auxiliary call degraded to empty list");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credential;
    use crate::client::Backend;
    use crate::testutils::MockUpstream;
    use std::time::Duration;

    const SUMMARY_BODY: &str =
        r#"{"totalRequests": 900, "anomalyCount": 12, "blockedCount": 3, "distinctSources": 45, "avgErrorRatio": 0.02}"#;
    const SUSPICIOUS_BODY: &str =
        r#"[{"ipAddress": "10.0.0.5", "score": -0.41, "requests": 120, "failCount": 60, "errorRatio": 0.5, "distinctUsers": 1}]"#;
    const SERIES_BODY: &str = r#"[{"minuteUtc": "2026-08-29T10:00:00Z", "count": 15}]"#;
    const BLOCKED_SERIES_BODY: &str = r#"[{"minuteUtc": "2026-08-29T10:00:00Z", "blocked": 2}]"#;
    const BLOCKED_TOP_BODY: &str =
        r#"[{"ipAddress": "10.0.0.7", "blocked": 9, "lastSeenUtc": "2026-08-29T10:03:00Z"}]"#;

    fn stub_all(mock: &MockUpstream) {
        mock.stub("api/dashboard/summary", 200, SUMMARY_BODY);
        mock.stub("api/anomaly/top-suspicious", 200, SUSPICIOUS_BODY);
        mock.stub("api/anomaly/series", 200, SERIES_BODY);
        mock.stub("api/anomaly/blocked-series", 200, BLOCKED_SERIES_BODY);
        mock.stub("api/anomaly/blocked-top", 200, BLOCKED_TOP_BODY);
    }

    async fn client_for(mock: &MockUpstream) -> crate::client::UpstreamClient {
        let base_url = mock.start().await;
        Backend::new(base_url, Duration::from_secs(5))
            .unwrap()
            .with_credential(Credential::new("test-token"))
    }

    #[tokio::test]
    async fn merges_all_five_calls() {
        let mock = MockUpstream::new();
        stub_all(&mock);
        let client = client_for(&mock).await;

        let view = fetch_dashboard(&client, TimeWindow::default(), TopN::default())
            .await
            .unwrap();

        assert_eq!(view.summary.total_requests, 900);
        assert_eq!(view.top_suspicious[0].ip_address, "10.0.0.5");
        assert_eq!(view.series[0].count, 15);
        assert_eq!(view.blocked_series[0].blocked, 2);
        assert_eq!(view.blocked_top[0].blocked, 9);

        for path in [
            "api/dashboard/summary",
            "api/anomaly/top-suspicious",
            "api/anomaly/series",
            "api/anomaly/blocked-series",
            "api/anomaly/blocked-top",
        ] {
            assert_eq!(mock.hits(path), 1, "expected one call to {path}");
        }
    }

    #[tokio::test]
    async fn base_failure_yields_empty_composite() {
        let mock = MockUpstream::new();
        stub_all(&mock);
        mock.stub("api/dashboard/summary", 503, "down");
        let client = client_for(&mock).await;

        let view = fetch_dashboard(&client, TimeWindow::default(), TopN::default()).await;

        assert!(view.is_none());
        // Auxiliary calls are still issued; their results are discarded.
        assert_eq!(mock.hits("api/anomaly/top-suspicious"), 1);
        assert_eq!(mock.hits("api/anomaly/blocked-top"), 1);
    }

    #[tokio::test]
    async fn unparseable_base_yields_empty_composite() {
        let mock = MockUpstream::new();
        stub_all(&mock);
        mock.stub("api/dashboard/summary", 200, "not json at all");
        let client = client_for(&mock).await;

        let view = fetch_dashboard(&client, TimeWindow::default(), TopN::default()).await;
        assert!(view.is_none());
    }

    #[tokio::test]
    async fn auxiliary_failure_degrades_only_its_own_field() {
        let mock = MockUpstream::new();
        stub_all(&mock);
        mock.stub("api/anomaly/top-suspicious", 500, "boom");
        let client = client_for(&mock).await;

        let view = fetch_dashboard(&client, TimeWindow::default(), TopN::default())
            .await
            .unwrap();

        assert!(view.top_suspicious.is_empty());
        assert_eq!(view.summary.total_requests, 900);
        assert_eq!(view.series.len(), 1);
        assert_eq!(view.blocked_series.len(), 1);
        assert_eq!(view.blocked_top.len(), 1);
    }

    #[tokio::test]
    async fn malformed_auxiliary_body_degrades_like_a_failure() {
        let mock = MockUpstream::new();
        stub_all(&mock);
        mock.stub("api/anomaly/series", 200, r#"{"not": "a list"}"#);
        let client = client_for(&mock).await;

        let view = fetch_dashboard(&client, TimeWindow::default(), TopN::default())
            .await
            .unwrap();

        assert!(view.series.is_empty());
        assert_eq!(view.blocked_series.len(), 1);
    }

    #[tokio::test]
    async fn omitted_parameters_behave_like_explicit_defaults() {
        let mock = MockUpstream::new();
        stub_all(&mock);
        let client = client_for(&mock).await;

        let defaulted = fetch_dashboard(&client, TimeWindow::new(None), TopN::new(None))
            .await
            .unwrap();
        let explicit = fetch_dashboard(&client, TimeWindow::new(Some(60)), TopN::new(Some(10)))
            .await
            .unwrap();

        assert_eq!(defaulted, explicit);
        assert_eq!(
            mock.last_query("api/anomaly/top-suspicious").as_deref(),
            Some("minutes=60&take=10")
        );
        assert_eq!(
            mock.last_query("api/anomaly/series").as_deref(),
            Some("minutes=60")
        );
    }

    #[tokio::test]
    async fn repeated_requests_are_structurally_equal() {
        let mock = MockUpstream::new();
        stub_all(&mock);
        let client = client_for(&mock).await;

        let first = fetch_dashboard(&client, TimeWindow::default(), TopN::default()).await;
        let second = fetch_dashboard(&client, TimeWindow::default(), TopN::default()).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn custom_window_and_top_n_are_forwarded() {
        let mock = MockUpstream::new();
        stub_all(&mock);
        let client = client_for(&mock).await;

        fetch_dashboard(&client, TimeWindow::new(Some(15)), TopN::new(Some(3))).await;

        assert_eq!(
            mock.last_query("api/anomaly/blocked-top").as_deref(),
            Some("minutes=15&take=3")
        );
        assert_eq!(
            mock.last_query("api/anomaly/blocked-series").as_deref(),
            Some("minutes=15")
        );
        assert_eq!(mock.last_query("api/dashboard/summary"), None);
    }
}
