//! Scriptable upstream backend used by unit tests.

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

#[derive(Default)]
struct Inner {
    /// Relative path (no leading slash) -> (status, body).
    responses: HashMap<String, (u16, String)>,
    hits: HashMap<String, usize>,
    last_query: HashMap<String, String>,
    last_bearer: Option<String>,
}

/// A real HTTP server on an ephemeral port whose per-path responses are
/// stubbed by each test. Unstubbed paths return 404.
#[derive(Clone, Default)]
pub(crate) struct MockUpstream {
    inner: Arc<Mutex<Inner>>,
}

impl MockUpstream {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn stub(&self, path: &str, status: u16, body: &str) {
        self.lock()
            .responses
            .insert(path.to_string(), (status, body.to_string()));
    }

    pub(crate) fn hits(&self, path: &str) -> usize {
        self.lock().hits.get(path).copied().unwrap_or(0)
    }

    pub(crate) fn total_hits(&self) -> usize {
        self.lock().hits.values().sum()
    }

    pub(crate) fn last_query(&self, path: &str) -> Option<String> {
        self.lock().last_query.get(path).cloned()
    }

    pub(crate) fn last_bearer(&self) -> Option<String> {
        self.lock().last_bearer.clone()
    }

    /// Bind an ephemeral port, serve in the background, return the base URL.
    pub(crate) async fn start(&self) -> Url {
        let app = Router::new().fallback(respond).with_state(self.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("mock upstream lock poisoned")
    }
}

async fn respond(State(mock): State<MockUpstream>, request: Request<Body>) -> Response {
    let path = request.uri().path().trim_start_matches('/').to_string();

    let mut inner = mock.lock();
    *inner.hits.entry(path.clone()).or_insert(0) += 1;
    if let Some(query) = request.uri().query() {
        inner.last_query.insert(path.clone(), query.to_string());
    }
    if let Some(auth) = request.headers().get(header::AUTHORIZATION) {
        inner.last_bearer = auth
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);
    }

    match inner.responses.get(&path) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).unwrap(),
            [(header::CONTENT_TYPE, "application/json")],
            body.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
