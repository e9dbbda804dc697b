//! Upstream HTTP client for the backend analytics API.
//!
//! [`Backend`] owns the pooled connection state and the configured base
//! address; it never holds a credential. Each request-handling flow derives
//! a request-scoped [`UpstreamClient`] via [`Backend::with_credential`] so
//! concurrent requests can never observe each other's bearer token.

use crate::auth::Credential;
use crate::metrics_defs::{UPSTREAM_FAILURES, UPSTREAM_REQUESTS};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// A single upstream call's failure mode.
///
/// Both variants degrade identically at the aggregation boundary; they are
/// kept distinct so tests can tell "endpoint down" from "endpoint returned
/// garbage".
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    Unavailable(String),
    #[error("malformed upstream payload: {0}")]
    Malformed(String),
}

/// Shared, credential-free handle to the backend API.
#[derive(Clone)]
pub struct Backend {
    http: reqwest::Client,
    base_url: Url,
}

impl Backend {
    /// Build a pooled client bound to `base_url` with a per-call timeout.
    ///
    /// The timeout covers the whole call, body included; a stalled upstream
    /// resolves to [`FetchError::Unavailable`] rather than hanging the
    /// request.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        // Relative joins drop the last path segment unless the base ends
        // with a slash.
        let mut base_url = base_url;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        Ok(Backend { http, base_url })
    }

    /// Derive the request-scoped client that attaches `credential` to every
    /// outgoing call.
    pub fn with_credential(&self, credential: Credential) -> UpstreamClient {
        UpstreamClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            credential,
        }
    }
}

/// Request-scoped client: one per inbound request, carrying that request's
/// bearer credential.
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Url,
    credential: Credential,
}

impl UpstreamClient {
    /// GET `path` relative to the base address and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::Unavailable(format!("invalid path {path}: {e}")))?;
        self.request_json(url, query).await
    }

    /// GET a templated path whose final segment is caller-supplied data.
    ///
    /// The segment is percent-encoded by the URL builder, so identifiers
    /// containing reserved characters cannot break out of their path
    /// position.
    pub async fn get_json_segment<T: DeserializeOwned>(
        &self,
        path: &str,
        segment: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::Unavailable(format!("invalid path {path}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Unavailable("base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(segment);
        self.request_json(url, query).await
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let endpoint = url.path().to_string();
        metrics::counter!(UPSTREAM_REQUESTS.name).increment(1);

        let response = self
            .http
            .get(url)
            .bearer_auth(self.credential.expose())
            .query(query)
            .send()
            .await
            .map_err(|e| {
                metrics::counter!(UPSTREAM_FAILURES.name).increment(1);
                FetchError::Unavailable(format!("{endpoint}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            metrics::counter!(UPSTREAM_FAILURES.name).increment(1);
            return Err(FetchError::Unavailable(format!(
                "{endpoint} returned {status}"
            )));
        }

        response.json::<T>().await.map_err(|e| {
            metrics::counter!(UPSTREAM_FAILURES.name).increment(1);
            FetchError::Malformed(format!("{endpoint}: {e}"))
        })
    }
}
