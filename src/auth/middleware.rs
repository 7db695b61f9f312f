//! Authentication middleware that checks the bearer token of each request.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json, RequestPartsExt,
    extract::{FromRef, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::{AuthKeys, Claims, is_token_revoked},
    db::lock_connection,
};

/// The state needed for the auth middleware and endpoints.
#[derive(Clone)]
pub struct AuthState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub auth_keys: AuthKeys,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            auth_keys: state.auth_keys.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

/// The raw bearer token of an authenticated request.
#[derive(Debug, Clone, PartialEq)]
pub struct BearerToken(pub String);

/// Middleware function that checks for a valid, unrevoked bearer token.
///
/// The token's [Claims] and the [BearerToken] are placed into the request
/// extensions and the request is executed normally. Otherwise the request is
/// rejected with 401 if there is no token, or 403 if it is invalid, expired
/// or revoked.
///
/// **Note**: Route handlers can use the function argument `Extension(claims): Extension<Claims>` to receive the claims.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let (claims, token) = match authenticate(&mut parts, &state).await {
        Ok(authenticated) => authenticated,
        Err(error) => return error.into_response(),
    };

    parts.extensions.insert(claims);
    parts.extensions.insert(token);

    next.run(Request::from_parts(parts, body)).await
}

async fn authenticate(parts: &mut Parts, state: &AuthState) -> Result<(Claims, BearerToken), Error> {
    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| Error::MissingToken)?;
    let token = bearer.token();

    let claims = state.auth_keys.verify_token(token)?;

    let connection = lock_connection(&state.db_connection)?;
    if is_token_revoked(token, &connection)? {
        return Err(Error::RevokedToken);
    }

    Ok((claims, BearerToken(token.to_owned())))
}

/// A route handler that confirms the bearer token is valid.
///
/// Must be mounted behind [auth_guard].
pub async fn validate_token_endpoint(Extension(claims): Extension<Claims>) -> Json<Value> {
    Json(json!({
        "message": "Token válido",
        "user": { "usuario_id": claims.id, "username": claims.username },
    }))
}
