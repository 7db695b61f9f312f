//! Defines the endpoint for registering a new user.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    Error,
    auth::{AuthState, Credentials, PasswordHash, User, ValidatedPassword, create_user},
    db::lock_connection,
    json::AppJson,
};

/// A route handler for registering a user, responds with the new user.
pub async fn register_user_endpoint(
    State(state): State<AuthState>,
    AppJson(credentials): AppJson<Credentials>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let (username, password) = credentials.validate()?;
    let password = ValidatedPassword::new(password, username)?;
    // Hash before taking the lock, bcrypt is slow on purpose.
    let password_hash = PasswordHash::new(&password, state.password_hash_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = register_user(username, password_hash, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Usuario registrado",
            "user": { "usuario_id": user.id, "username": user.username },
        })),
    ))
}

/// Store a new user with an already hashed password.
pub fn register_user(
    username: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let user = create_user(username, password_hash, connection)?;
    tracing::info!("Registered user {}", user.id);

    Ok(user)
}
