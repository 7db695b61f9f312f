//! Defines the endpoint for creating a new bank.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, params};

use crate::{
    Error,
    bank::{Bank, BankForm, BankState, core::bank_name_taken},
    db::lock_connection,
    json::AppJson,
    session::SessionId,
};

/// A route handler for creating a new bank owned by the caller's session, responds with the new bank.
pub async fn create_bank_endpoint(
    State(state): State<BankState>,
    session_id: SessionId,
    AppJson(form): AppJson<BankForm>,
) -> Result<(StatusCode, Json<Bank>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let bank = create_bank(&form, &session_id, &connection).inspect_err(|error| {
        tracing::debug!("Could not create bank with {form:?}: {error}");
    })?;

    Ok((StatusCode::CREATED, Json(bank)))
}

/// Create a bank owned by `session_id`.
///
/// # Errors
/// Returns [Error::InvalidInput] if a field is missing, or
/// [Error::DuplicateBankName] if a bank with the same name (ignoring case) is
/// visible to the session.
pub fn create_bank(
    form: &BankForm,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Bank, Error> {
    let (name, balance) = form.validate()?;

    if bank_name_taken(&name, session_id, None, connection)? {
        return Err(Error::DuplicateBankName(name));
    }

    connection.execute(
        "INSERT INTO bancos (nombre, saldo_total, session_id) VALUES (?1, ?2, ?3)",
        params![name, balance, session_id.as_str()],
    )?;

    Ok(Bank {
        id: connection.last_insert_rowid(),
        name,
        balance,
        session_id: Some(session_id.to_string()),
    })
}
