//! Defines the endpoint for logging out by revoking the bearer token.

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{AuthState, BearerToken, revoke_token},
    db::lock_connection,
};

/// A route handler that revokes the request's bearer token.
///
/// Must be mounted behind [crate::auth::auth_guard].
pub async fn log_out_endpoint(
    State(state): State<AuthState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    revoke_token(
        &token,
        OffsetDateTime::now_utc(),
        state.auth_keys.token_duration,
        &connection,
    )?;

    Ok(Json(json!({ "message": "Sesión cerrada" })))
}
