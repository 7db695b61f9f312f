//! Defines the endpoint for changing the number of a check.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::Connection;

use crate::{
    Error,
    check::{
        Check, CheckForm, CheckId, CheckState, check_number_taken, get_check,
        update_check_number,
    },
    db::lock_connection,
    error::Resource,
    json::AppJson,
    session::{SessionId, ensure_owner},
};

/// A route handler for updating a check owned by the caller's session.
pub async fn edit_check_endpoint(
    State(state): State<CheckState>,
    session_id: SessionId,
    Path(check_id): Path<CheckId>,
    AppJson(form): AppJson<CheckForm>,
) -> Result<Json<Check>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    edit_check(check_id, &form, &session_id, &connection).map(Json)
}

pub fn edit_check(
    id: CheckId,
    form: &CheckForm,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Check, Error> {
    let check = get_check(id, connection)?;
    ensure_owner(check.session_id.as_deref(), session_id, Resource::Check)?;

    let number = form.validate()?;

    if check_number_taken(&number, session_id, Some(id), connection)? {
        return Err(Error::DuplicateCheckNumber(number.to_string()));
    }

    update_check_number(id, &number, connection)?;

    Ok(Check {
        number: number.to_string(),
        ..check
    })
}
