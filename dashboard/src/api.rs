//! HTTP surface consumed by the presentation layer.
//!
//! Every route runs the credential gate first; unauthenticated requests are
//! redirected to the login flow before any upstream call. Detail-view
//! failures redirect back to the aggregate view with a user-facing message
//! in the `error` query parameter.

use crate::aggregator::{self, TimeWindow, TopN};
use crate::auth::CredentialGate;
use crate::client::Backend;
use crate::detail;
use crate::errors::GatewayError;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tokio::net::TcpListener;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Request-independent state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: CredentialGate,
    pub backend: Backend,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(DASHBOARD_PATH, get(dashboard))
        .route("/dashboard/ip/{ip}", get(ip_detail))
        .with_state(state)
}

pub async fn serve(host: &str, port: u16, state: AppState) -> Result<(), ApiError> {
    let listener = TcpListener::bind(format!("{host}:{port}")).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Deserialize, Debug)]
struct DashboardParams {
    minutes: Option<u32>,
    take: Option<u32>,
}

async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let credential = state.gate.authorize(&headers).await?;
    let client = state.backend.with_credential(credential);

    let view = aggregator::fetch_dashboard(
        &client,
        TimeWindow::new(params.minutes),
        TopN::new(params.take),
    )
    .await;

    Ok(Json(view).into_response())
}

#[derive(Deserialize, Debug)]
struct DetailParams {
    minutes: Option<u32>,
}

async fn ip_detail(
    State(state): State<AppState>,
    Path(ip): Path<String>,
    Query(params): Query<DetailParams>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let credential = state.gate.authorize(&headers).await?;
    let client = state.backend.with_credential(credential);

    let detail = detail::fetch_ip_detail(&client, &ip, TimeWindow::new(params.minutes)).await?;
    Ok(Json(detail).into_response())
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Unauthenticated => Redirect::to(LOGIN_PATH).into_response(),
            GatewayError::InvalidInput(_) | GatewayError::UpstreamUnavailable(_) => {
                let message: String =
                    url::form_urlencoded::byte_serialize(self.to_string().as_bytes()).collect();
                Redirect::to(&format!("{DASHBOARD_PATH}?error={message}")).into_response()
            }
        }
    }
}
