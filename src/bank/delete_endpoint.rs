//! Defines the endpoint for deleting a bank.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};
use serde_json::{Value, json};

use crate::{
    Error,
    bank::{BankId, BankState, get_bank},
    db::lock_connection,
    error::Resource,
    session::{SessionId, ensure_owner},
};

/// A route handler for deleting a bank owned by the caller's session.
///
/// The bank's transactions are deleted with it.
pub async fn delete_bank_endpoint(
    State(state): State<BankState>,
    session_id: SessionId,
    Path(bank_id): Path<BankId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_bank(bank_id, &session_id, &connection)
        .inspect_err(|error| tracing::debug!("Could not delete bank {bank_id}: {error}"))?;

    Ok(Json(json!({ "message": "Banco eliminado con éxito" })))
}

/// Delete the bank `id` if it is owned by `session_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the bank does not exist, or
/// [Error::BaseRecord] or [Error::ForeignSession] if `session_id` does not own it.
pub fn delete_bank(id: BankId, session_id: &SessionId, connection: &Connection) -> Result<(), Error> {
    let bank = get_bank(id, connection)?;
    ensure_owner(bank.session_id.as_deref(), session_id, Resource::Bank)?;

    connection.execute("DELETE FROM bancos WHERE banco_id = ?1", params![id])?;

    Ok(())
}
