//! Defines the endpoint for deleting a transaction.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};
use serde_json::{Value, json};

use crate::{
    Error,
    db::lock_connection,
    error::Resource,
    session::{SessionId, ensure_owner},
    transaction::{TransactionId, TransactionState, get_transaction},
};

/// What was removed by [delete_transaction].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Only the transaction was deleted.
    Transaction,
    /// The transaction and the check it paid with were deleted.
    TransactionAndCheck,
}

/// A route handler for deleting a transaction owned by the caller's session.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    session_id: SessionId,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let message = match delete_transaction(transaction_id, &session_id, &connection)? {
        DeleteOutcome::Transaction => "Transacción eliminada",
        DeleteOutcome::TransactionAndCheck => "Transacción y cheque eliminados",
    };

    Ok(Json(json!({ "message": message })))
}

/// Delete the transaction `id` and the check it paid with.
///
/// Checks that belong to no session are kept since other transactions may use them.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist, or
/// [Error::BaseRecord] or [Error::ForeignSession] if `session_id` does not own it.
pub fn delete_transaction(
    id: TransactionId,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<DeleteOutcome, Error> {
    let transaction = get_transaction(id, connection)?;
    ensure_owner(
        transaction.session_id.as_deref(),
        session_id,
        Resource::Transaction,
    )?;

    connection.execute(
        "DELETE FROM transacciones WHERE transaccion_id = ?1",
        params![id],
    )?;

    let Some(check_id) = transaction.check_id else {
        return Ok(DeleteOutcome::Transaction);
    };

    let checks_deleted = connection.execute(
        "DELETE FROM cheques WHERE cheque_id = ?1 AND session_id = ?2",
        params![check_id, session_id.as_str()],
    )?;

    Ok(if checks_deleted > 0 {
        DeleteOutcome::TransactionAndCheck
    } else {
        DeleteOutcome::Transaction
    })
}
