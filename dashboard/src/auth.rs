//! Credential gate: per-request bearer token resolution.
//!
//! Every handled operation re-validates through [`CredentialGate::authorize`]
//! before any upstream call is issued. The session store itself is an opaque
//! key-value dependency; this crate only reads from it.

use crate::errors::GatewayError;
use crate::metrics_defs::UNAUTHENTICATED_REQUESTS;
use async_trait::async_trait;
use http::HeaderMap;
use http::header::COOKIE;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Cookie that carries the session identifier on inbound requests.
pub const SESSION_COOKIE: &str = "sid";

/// An opaque bearer token scoped to one user session.
///
/// `Debug` is implemented by hand so the token cannot leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    /// The raw token, for attachment to an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(..)")
    }
}

/// Opaque session-to-credential lookup.
///
/// Session creation and expiry are owned elsewhere; implementations only
/// answer "what bearer token, if any, is stored for this session id".
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn credential(&self, session_id: &str) -> Option<String>;
}

/// In-memory store used in tests and local runs.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session_id: impl Into<String>, token: impl Into<String>) {
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .insert(session_id.into(), token.into());
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn credential(&self, session_id: &str) -> Option<String> {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .get(session_id)
            .cloned()
    }
}

/// Pre-condition gate run before every handled operation.
#[derive(Clone)]
pub struct CredentialGate {
    store: Arc<dyn SessionStore>,
}

impl CredentialGate {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        CredentialGate { store }
    }

    /// Resolve the bearer credential for this request.
    ///
    /// A missing session cookie, an unknown session id, or an empty stored
    /// token all yield [`GatewayError::Unauthenticated`]; the caller must
    /// redirect to the login flow without issuing any upstream call.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Credential, GatewayError> {
        let Some(session_id) = session_id_from_headers(headers) else {
            return Err(self.reject("no session cookie"));
        };

        match self.store.credential(&session_id).await {
            Some(token) if !token.is_empty() => Ok(Credential::new(token)),
            Some(_) => Err(self.reject("empty credential in session store")),
            None => Err(self.reject("unknown session id")),
        }
    }

    fn reject(&self, reason: &'static str) -> GatewayError {
        metrics::counter!(UNAUTHENTICATED_REQUESTS.name).increment(1);
        tracing::debug!(reason, "request rejected by credential gate");
        GatewayError::Unauthenticated
    }
}

fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}
