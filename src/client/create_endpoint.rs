//! Defines the endpoint for creating a new client.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::Connection;

use crate::{
    Error,
    client::{Client, ClientForm, ClientState, core::client_name_taken, insert_client},
    db::lock_connection,
    json::AppJson,
    session::SessionId,
};

/// A route handler for creating a new client owned by the caller's session.
pub async fn create_client_endpoint(
    State(state): State<ClientState>,
    session_id: SessionId,
    AppJson(form): AppJson<ClientForm>,
) -> Result<(StatusCode, Json<Client>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let client = create_client(&form, &session_id, &connection)?;

    Ok((StatusCode::CREATED, Json(client)))
}

/// Create a client owned by `session_id`.
///
/// # Errors
/// Returns [Error::InvalidInput] if the first name is missing, or
/// [Error::DuplicateClientName] if a client with the same names (ignoring
/// case) is visible to the session.
pub fn create_client(
    form: &ClientForm,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Client, Error> {
    let (first_name, last_name) = form.validate()?;

    if client_name_taken(&first_name, last_name.as_deref(), session_id, None, connection)? {
        return Err(Error::DuplicateClientName(first_name));
    }

    insert_client(&first_name, last_name.as_deref(), session_id, connection)
}
