//! Anonymous sessions that scope which records a caller may see and modify.
//!
//! Every request carries a session id in the `x-session-id` header. Records
//! created by a request are owned by its session, while records with no owner
//! are base data that everyone can read but nobody can change.

use std::fmt::Display;

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderValue, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{Error, error::Resource};

/// The request and response header that carries the session id.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// The id of the anonymous session that made a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an existing session id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a new random session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The session id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionId>()
            .cloned()
            .ok_or(Error::MissingSession)
    }
}

/// Middleware that attaches a [SessionId] to every request.
///
/// The id is read from the `x-session-id` header. If the header is missing or
/// blank a new id is generated and sent back in the same header so the client
/// can store it and send it with later requests.
pub async fn session_middleware(mut request: Request, next: Next) -> Response {
    let provided = request
        .headers()
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(SessionId::new);

    let (session_id, is_new) = match provided {
        Some(session_id) => (session_id, false),
        None => {
            let session_id = SessionId::generate();
            tracing::debug!("Assigned new session id {session_id}");
            (session_id, true)
        }
    };

    request.extensions_mut().insert(session_id.clone());
    let mut response = next.run(request).await;

    if is_new {
        match HeaderValue::from_str(session_id.as_str()) {
            Ok(value) => {
                response.headers_mut().insert(SESSION_ID_HEADER, value);
            }
            Err(error) => tracing::error!("Could not set session id header: {error}"),
        }
    }

    response
}

/// Check that the caller may modify a record owned by `owner`.
///
/// # Errors
/// Returns [Error::BaseRecord] if the record has no owner, or
/// [Error::ForeignSession] if it belongs to a different session.
pub fn ensure_owner(
    owner: Option<&str>,
    session_id: &SessionId,
    resource: Resource,
) -> Result<(), Error> {
    match owner {
        None => Err(Error::BaseRecord(resource)),
        Some(owner) if owner == session_id.as_str() => Ok(()),
        Some(_) => Err(Error::ForeignSession(resource)),
    }
}

/// Whether a record owned by `owner` is visible to the caller.
pub fn is_visible(owner: Option<&str>, session_id: &SessionId) -> bool {
    owner.is_none_or(|owner| owner == session_id.as_str())
}
