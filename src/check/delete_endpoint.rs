//! Defines the endpoint for deleting a check.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};
use serde_json::{Value, json};

use crate::{
    Error,
    check::{CheckId, CheckState, get_check},
    db::lock_connection,
    error::Resource,
    session::{SessionId, ensure_owner},
};

/// A route handler for deleting a check owned by the caller's session.
pub async fn delete_check_endpoint(
    State(state): State<CheckState>,
    session_id: SessionId,
    Path(check_id): Path<CheckId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_check(check_id, &session_id, &connection)?;

    Ok(Json(json!({ "message": "Cheque eliminado con éxito" })))
}

/// Delete the check `id` if it is owned by `session_id`.
///
/// A transaction that paid with the check is kept without it.
pub fn delete_check(id: CheckId, session_id: &SessionId, connection: &Connection) -> Result<(), Error> {
    let check = get_check(id, connection)?;
    ensure_owner(check.session_id.as_deref(), session_id, Resource::Check)?;

    connection.execute("DELETE FROM cheques WHERE cheque_id = ?1", params![id])?;

    Ok(())
}
