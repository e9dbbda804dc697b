use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T, E = GatewayError> = std::result::Result<T, E>;

/// Errors surfaced to the presentation layer.
///
/// Upstream specifics (status codes, transport errors) never cross this
/// boundary; they are logged where they happen and collapsed into
/// `UpstreamUnavailable`.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No credential is stored for this session. Callers redirect to the
    /// login flow without touching any upstream.
    #[error("no credential present for this session")]
    Unauthenticated,

    /// Caller-supplied input was rejected before any network call.
    #[error("{0}")]
    InvalidInput(String),

    /// The single upstream call behind a detail view failed. Carries the
    /// requested identifier for the user-facing message.
    #[error("could not retrieve details for {0}")]
    UpstreamUnavailable(String),
}
