//! Defines the endpoint for updating a bank.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};

use crate::{
    Error,
    bank::{Bank, BankForm, BankId, BankState, core::bank_name_taken, get_bank},
    db::lock_connection,
    error::Resource,
    json::AppJson,
    session::{SessionId, ensure_owner},
};

/// A route handler for updating a bank owned by the caller's session, responds with the updated bank.
pub async fn edit_bank_endpoint(
    State(state): State<BankState>,
    session_id: SessionId,
    Path(bank_id): Path<BankId>,
    AppJson(form): AppJson<BankForm>,
) -> Result<Json<Bank>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    edit_bank(bank_id, &form, &session_id, &connection)
        .inspect_err(|error| tracing::debug!("Could not update bank {bank_id}: {error}"))
        .map(Json)
}

/// Update the name and balance of the bank `id`.
///
/// # Errors
/// Returns [Error::NotFound] if the bank does not exist, [Error::BaseRecord] or
/// [Error::ForeignSession] if `session_id` does not own it, and the same
/// validation errors as [crate::bank::create_bank].
pub fn edit_bank(
    id: BankId,
    form: &BankForm,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Bank, Error> {
    let bank = get_bank(id, connection)?;
    ensure_owner(bank.session_id.as_deref(), session_id, Resource::Bank)?;

    let (name, balance) = form.validate()?;

    if bank_name_taken(&name, session_id, Some(id), connection)? {
        return Err(Error::DuplicateBankName(name));
    }

    connection.execute(
        "UPDATE bancos SET nombre = ?1, saldo_total = ?2 WHERE banco_id = ?3",
        params![name, balance, id],
    )?;

    Ok(Bank {
        id,
        name,
        balance,
        session_id: bank.session_id,
    })
}
