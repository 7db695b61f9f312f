//! Defines the endpoint for creating a new check.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::Connection;

use crate::{
    Error,
    check::{Check, CheckForm, CheckState, check_number_taken, insert_check},
    db::lock_connection,
    json::AppJson,
    session::SessionId,
};

/// A route handler for creating a new check owned by the caller's session.
pub async fn create_check_endpoint(
    State(state): State<CheckState>,
    session_id: SessionId,
    AppJson(form): AppJson<CheckForm>,
) -> Result<(StatusCode, Json<Check>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let check = create_check(&form, &session_id, &connection)?;

    Ok((StatusCode::CREATED, Json(check)))
}

/// Create a check owned by `session_id`.
///
/// # Errors
/// Returns [Error::InvalidInput] if the number is missing or blank, or
/// [Error::DuplicateCheckNumber] if a check with the same number is visible to
/// the session.
pub fn create_check(
    form: &CheckForm,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Check, Error> {
    let number = form.validate()?;

    if check_number_taken(&number, session_id, None, connection)? {
        return Err(Error::DuplicateCheckNumber(number.to_string()));
    }

    insert_check(&number, session_id, connection)
}
