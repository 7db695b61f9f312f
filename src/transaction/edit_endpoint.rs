//! Defines the endpoint for updating a transaction.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    bank::{BankId, get_visible_bank},
    check::{CheckId, CheckNumber},
    client::ClientId,
    db::lock_connection,
    error::Resource,
    json::AppJson,
    session::{SessionId, ensure_owner},
    transaction::{
        TransactionId, TransactionKind, TransactionResponse, TransactionState, TransactionView,
        format_stored_date, get_transaction, get_transaction_view, parse_date_input,
        resolve_check_for_edit, resolve_client,
    },
};

/// The JSON body for updating a transaction.
///
/// Fields that are left out keep their current values.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct EditTransactionForm {
    #[serde(rename = "fecha")]
    pub date: Option<String>,
    #[serde(rename = "tipo")]
    pub kind: Option<String>,
    #[serde(rename = "monto")]
    pub amount: Option<f64>,
    #[serde(rename = "banco_id")]
    pub bank_id: Option<BankId>,
    #[serde(rename = "cliente_id")]
    pub client_id: Option<ClientId>,
    /// The full name of a client to find or create. An empty name removes the client.
    #[serde(rename = "nombre_cliente")]
    pub client_name: Option<String>,
    /// The check to renumber, defaults to the transaction's current check.
    #[serde(rename = "cheque_id")]
    pub check_id: Option<CheckId>,
    #[serde(rename = "numero_cheque")]
    pub check_number: Option<CheckNumber>,
}

/// A route handler for updating a transaction owned by the caller's session.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    session_id: SessionId,
    Path(transaction_id): Path<TransactionId>,
    AppJson(form): AppJson<EditTransactionForm>,
) -> Result<Json<TransactionResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transaction = edit_transaction(transaction_id, &form, &session_id, &connection)
        .inspect_err(|error| {
            tracing::debug!("Could not update transaction {transaction_id}: {error}")
        })?;

    Ok(Json(TransactionResponse {
        message: "Transacción actualizada con éxito",
        transaction,
    }))
}

/// Update the transaction `id`.
///
/// Ownership is checked before the request is looked at. A check that the
/// transaction stops using is left in place.
///
/// # Errors
/// Returns [Error::NotFound], [Error::BaseRecord] or [Error::ForeignSession]
/// if the transaction is missing or not owned by `session_id`, then the same
/// validation errors as [crate::transaction::create_transaction].
pub fn edit_transaction(
    id: TransactionId,
    form: &EditTransactionForm,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<TransactionView, Error> {
    let existing = get_transaction(id, connection)?;
    ensure_owner(
        existing.session_id.as_deref(),
        session_id,
        Resource::Transaction,
    )?;

    let kind = match form.kind.as_deref() {
        Some(kind) => kind.parse::<TransactionKind>()?,
        None => existing.kind,
    };
    let amount = match form.amount {
        Some(amount) if amount.is_finite() => amount,
        Some(_) => return Err(Error::InvalidInput("Monto inválido".to_owned())),
        None => existing.amount,
    };
    let date = match form.date.as_deref().filter(|text| !text.trim().is_empty()) {
        Some(text) => parse_date_input(text)?,
        None => existing.date,
    };
    let date = format_stored_date(date)?;

    let bank_id = match form.bank_id {
        Some(bank_id) => get_visible_bank(bank_id, session_id, connection)?.id,
        None => existing.bank_id,
    };

    let client_id = if form.client_id.is_none() && form.client_name.is_none() {
        existing.client_id
    } else {
        resolve_client(
            form.client_id,
            form.client_name.as_deref(),
            session_id,
            connection,
        )?
    };

    let check_id = resolve_check_for_edit(
        kind,
        form.check_id.or(existing.check_id),
        form.check_number.as_ref(),
        session_id,
        connection,
    )?;

    connection.execute(
        "UPDATE transacciones
        SET fecha = ?1, tipo = ?2, monto = ?3, banco_id = ?4, cliente_id = ?5, cheque_id = ?6
        WHERE transaccion_id = ?7",
        params![date, kind, amount, bank_id, client_id, check_id, id],
    )?;

    get_transaction_view(id, connection)
}
