//! Defines the endpoint for creating a new transaction.

use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    bank::{BankId, get_visible_bank},
    check::CheckNumber,
    client::ClientId,
    db::lock_connection,
    json::AppJson,
    session::SessionId,
    transaction::{
        TransactionKind, TransactionResponse, TransactionState, TransactionView,
        format_stored_date, get_transaction_view, parse_date_input, resolve_check_for_create,
        resolve_client,
    },
};

/// The JSON body for creating a transaction.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct CreateTransactionForm {
    /// When the transaction happened, defaults to now.
    #[serde(rename = "fecha")]
    pub date: Option<String>,
    #[serde(rename = "tipo")]
    pub kind: Option<String>,
    #[serde(rename = "monto")]
    pub amount: Option<f64>,
    #[serde(rename = "banco_id")]
    pub bank_id: Option<BankId>,
    /// An existing client. Takes precedence over `client_name`.
    #[serde(rename = "cliente_id")]
    pub client_id: Option<ClientId>,
    /// The full name of a client to find or create.
    #[serde(rename = "nombre_cliente")]
    pub client_name: Option<String>,
    /// The check number. Older clients send the number in this field.
    #[serde(rename = "cheque_id")]
    pub legacy_check_number: Option<CheckNumber>,
    #[serde(rename = "numero_cheque")]
    pub check_number: Option<CheckNumber>,
}

/// A route handler for creating a new transaction owned by the caller's session.
///
/// Responds with the transaction and the ids of any client or check it created.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    session_id: SessionId,
    AppJson(form): AppJson<CreateTransactionForm>,
) -> Result<(StatusCode, Json<TransactionResponse>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transaction = create_transaction(&form, &session_id, &connection)
        .inspect_err(|error| tracing::debug!("Could not create transaction: {error}"))?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            message: "Transacción agregada con éxito",
            transaction,
        }),
    ))
}

/// Create a transaction owned by `session_id`.
///
/// The request is validated before any client or check is created.
///
/// # Errors
/// Returns [Error::InvalidInput] if the type, amount or bank are missing or
/// invalid, [Error::InvalidBank] or [Error::InvalidClient] if they reference
/// rows the session cannot see.
pub fn create_transaction(
    form: &CreateTransactionForm,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<TransactionView, Error> {
    let kind: TransactionKind = form
        .kind
        .as_deref()
        .ok_or_else(|| Error::InvalidInput("Faltan datos: tipo".to_owned()))?
        .parse()?;
    let amount = form
        .amount
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| Error::InvalidInput("Faltan datos: monto".to_owned()))?;
    let bank_id = form
        .bank_id
        .ok_or_else(|| Error::InvalidInput("Faltan datos: banco_id".to_owned()))?;
    let date = match form.date.as_deref().filter(|text| !text.trim().is_empty()) {
        Some(text) => parse_date_input(text)?,
        None => OffsetDateTime::now_utc(),
    };
    let date = format_stored_date(date)?;

    get_visible_bank(bank_id, session_id, connection)?;

    let client_id = resolve_client(
        form.client_id,
        form.client_name.as_deref(),
        session_id,
        connection,
    )?;
    let check_number = form.check_number.as_ref().or(form.legacy_check_number.as_ref());
    let check_id = resolve_check_for_create(kind, check_number, session_id, connection)?;

    connection.execute(
        "INSERT INTO transacciones (fecha, tipo, monto, banco_id, cliente_id, cheque_id, session_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            date,
            kind,
            amount,
            bank_id,
            client_id,
            check_id,
            session_id.as_str()
        ],
    )?;

    get_transaction_view(connection.last_insert_rowid(), connection)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        endpoints,
        session::SessionId,
        test_utils::{
            SESSION_A, get_test_server, insert_base_bank, must_create_test_connection,
            must_get_test_state, with_session,
        },
        transaction::{CreateTransactionForm, TransactionKind, TransactionView, create_transaction},
    };

    fn count(table: &str, connection: &rusqlite::Connection) -> i64 {
        connection
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[tokio::test]
    async fn check_payment_creates_client_check_and_transaction() {
        let state = must_get_test_state(Default::default());
        let bank_id = insert_base_bank("BROU", 0.0, &state.db_connection.lock().unwrap());
        let db_connection = state.db_connection.clone();
        let server = get_test_server(state);

        let response = with_session(server.post(endpoints::TRANSACTIONS), SESSION_A)
            .json(&json!({
                "tipo": "pago_cheque",
                "cheque_id": "1001",
                "banco_id": bank_id,
                "monto": 500,
                "nombre_cliente": "Juan Perez",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction = response.json::<TransactionView>();
        assert_eq!(transaction.kind, TransactionKind::PagoCheque);
        assert_eq!(transaction.amount, 500.0);
        assert!(transaction.client_id.is_some());
        assert!(transaction.check_id.is_some());
        assert_eq!(transaction.client_name.as_deref(), Some("Juan Perez"));
        assert_eq!(transaction.check_number.as_deref(), Some("1001"));
        assert_eq!(transaction.session_id.as_deref(), Some(SESSION_A));

        let connection = db_connection.lock().unwrap();
        assert_eq!(count("clientes", &connection), 1);
        assert_eq!(count("cheques", &connection), 1);
        assert_eq!(count("transacciones", &connection), 1);
    }

    #[tokio::test]
    async fn missing_amount_is_bad_request() {
        let server = get_test_server(must_get_test_state(Default::default()));

        let response = with_session(server.post(endpoints::TRANSACTIONS), SESSION_A)
            .json(&json!({ "tipo": "pago", "banco_id": 1 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Faltan datos: monto" }));
    }

    #[test]
    fn validation_happens_before_client_is_created() {
        let connection = must_create_test_connection();
        let form = CreateTransactionForm {
            kind: Some("pago".to_owned()),
            amount: Some(1.0),
            bank_id: Some(42),
            client_name: Some("Nadie Nuevo".to_owned()),
            ..Default::default()
        };

        let result = create_transaction(&form, &SessionId::new("a"), &connection);

        assert_eq!(result, Err(Error::InvalidBank(42)));
        assert_eq!(count("clientes", &connection), 0);
    }

    #[test]
    fn uses_given_date() {
        let connection = must_create_test_connection();
        let bank_id = insert_base_bank("BROU", 0.0, &connection);
        let form = CreateTransactionForm {
            date: Some("2025-02-03".to_owned()),
            kind: Some("impuesto".to_owned()),
            amount: Some(12.5),
            bank_id: Some(bank_id),
            ..Default::default()
        };

        let transaction = create_transaction(&form, &SessionId::new("a"), &connection).unwrap();

        assert_eq!(transaction.date, datetime!(2025-02-03 00:00 UTC));
        assert_eq!(transaction.client_id, None);
        assert_eq!(transaction.check_id, None);
    }

    #[test]
    fn blank_date_means_now() {
        let connection = must_create_test_connection();
        let bank_id = insert_base_bank("BROU", 0.0, &connection);
        let form = CreateTransactionForm {
            date: Some("  ".to_owned()),
            kind: Some("impuesto".to_owned()),
            amount: Some(12.5),
            bank_id: Some(bank_id),
            ..Default::default()
        };
        let before = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();

        let transaction = create_transaction(&form, &SessionId::new("a"), &connection).unwrap();

        assert!(transaction.date >= before);
    }

    #[test]
    fn number_field_takes_precedence_over_legacy_field() {
        let connection = must_create_test_connection();
        let bank_id = insert_base_bank("BROU", 0.0, &connection);
        let form = CreateTransactionForm {
            kind: Some("pago_cheque".to_owned()),
            amount: Some(1.0),
            bank_id: Some(bank_id),
            legacy_check_number: Some(crate::check::CheckNumber::new("1")),
            check_number: Some(crate::check::CheckNumber::new("2")),
            ..Default::default()
        };

        let transaction = create_transaction(&form, &SessionId::new("a"), &connection).unwrap();

        assert_eq!(transaction.check_number.as_deref(), Some("2"));
    }
}
