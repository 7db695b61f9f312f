//! Defines the endpoint for logging in and receiving a bearer token.

use axum::{Json, extract::State};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{AuthKeys, AuthState, get_user_by_username},
    db::lock_connection,
    json::AppJson,
};

/// The username and password sent to register or log in.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Get the trimmed username and the password.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if either is missing or blank.
    pub(super) fn validate(&self) -> Result<(&str, &str), Error> {
        let username = self.username.as_deref().map(str::trim);
        let password = self.password.as_deref();

        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok((username, password))
            }
            _ => Err(Error::InvalidInput(
                "Faltan datos: username o password".to_owned(),
            )),
        }
    }
}

/// A route handler for logging in, responds with a bearer token.
pub async fn log_in_endpoint(
    State(state): State<AuthState>,
    AppJson(credentials): AppJson<Credentials>,
) -> Result<Json<Value>, Error> {
    let (username, password) = credentials.validate()?;
    let connection = lock_connection(&state.db_connection)?;

    let token = log_in(
        username,
        password,
        &state.auth_keys,
        OffsetDateTime::now_utc(),
        &connection,
    )?;

    Ok(Json(json!({ "message": "Login exitoso", "token": token })))
}

/// Check the password of `username` and issue a token.
///
/// # Errors
/// Returns [Error::InvalidCredentials] if the user does not exist or the
/// password does not match. The two cases are not told apart.
pub fn log_in(
    username: &str,
    password: &str,
    auth_keys: &AuthKeys,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<String, Error> {
    let Some(user) = get_user_by_username(username, connection)? else {
        tracing::debug!("Log in attempt for unknown user {username}");
        return Err(Error::InvalidCredentials);
    };

    if !user.password_hash.verify(password)? {
        tracing::debug!("Wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    auth_keys.create_token(&user, now)
}
