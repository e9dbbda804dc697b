//! Single-call detail fetch for one address.
//!
//! Unlike the aggregate view, the detail view has nothing to degrade to: if
//! its one upstream call fails, the whole operation fails and the caller
//! redirects back to the aggregate view with a message naming the address.

use crate::aggregator::TimeWindow;
use crate::client::UpstreamClient;
use crate::errors::GatewayError;
use crate::models::IpDetail;

/// Fetch the per-address detail record.
///
/// The identifier is trimmed first; a blank identifier fails with
/// [`GatewayError::InvalidInput`] before any network call. A successful call
/// whose body decodes to JSON `null` yields a default record carrying the
/// requested address, so the presentation layer always has a key.
pub async fn fetch_ip_detail(
    client: &UpstreamClient,
    ip: &str,
    window: TimeWindow,
) -> Result<IpDetail, GatewayError> {
    let ip = ip.trim();
    if ip.is_empty() {
        return Err(GatewayError::InvalidInput(
            "an IP address is required".to_string(),
        ));
    }

    let result = client
        .get_json_segment::<Option<IpDetail>>(
            "api/anomaly/ip/",
            ip,
            &[("minutes", window.minutes().to_string())],
        )
        .await;

    match result {
        Ok(Some(mut detail)) => {
            detail.ip = ip.to_string();
            Ok(detail)
        }
        Ok(None) => Ok(IpDetail {
            ip: ip.to_string(),
            ..IpDetail::default()
        }),
        Err(e) => {
            tracing::warn!(ip, error = %e, "detail fetch failed");
            Err(GatewayError::UpstreamUnavailable(ip.to_string()))
        }
    }
}
