//! Defines the core data models and database queries for transactions.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::{
    Connection, Row, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    bank::BankId,
    check::CheckId,
    client::ClientId,
    database_id::DatabaseId,
    error::Resource,
    transaction::date::parse_stored_date,
};

pub type TransactionId = DatabaseId;

// ============================================================================
// MODELS
// ============================================================================

/// What kind of movement of money a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Transferencia,
    Interdeposito,
    GastosMantenimiento,
    Impuesto,
    ChequeDeposito,
    RetiroCheque,
    DepositoEfectivo,
    RetiroEfectivo,
    /// A payment made with a check. Only this kind references a check.
    PagoCheque,
    Pago,
}

impl TransactionKind {
    /// The name used in JSON and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Transferencia => "transferencia",
            TransactionKind::Interdeposito => "interdeposito",
            TransactionKind::GastosMantenimiento => "gastos_mantenimiento",
            TransactionKind::Impuesto => "impuesto",
            TransactionKind::ChequeDeposito => "cheque_deposito",
            TransactionKind::RetiroCheque => "retiro_cheque",
            TransactionKind::DepositoEfectivo => "deposito_efectivo",
            TransactionKind::RetiroEfectivo => "retiro_efectivo",
            TransactionKind::PagoCheque => "pago_cheque",
            TransactionKind::Pago => "pago",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "transferencia" => Ok(TransactionKind::Transferencia),
            "interdeposito" => Ok(TransactionKind::Interdeposito),
            "gastos_mantenimiento" => Ok(TransactionKind::GastosMantenimiento),
            "impuesto" => Ok(TransactionKind::Impuesto),
            "cheque_deposito" => Ok(TransactionKind::ChequeDeposito),
            "retiro_cheque" => Ok(TransactionKind::RetiroCheque),
            "deposito_efectivo" => Ok(TransactionKind::DepositoEfectivo),
            "retiro_efectivo" => Ok(TransactionKind::RetiroEfectivo),
            "pago_cheque" => Ok(TransactionKind::PagoCheque),
            "pago" => Ok(TransactionKind::Pago),
            other => Err(Error::InvalidInput(format!(
                "Tipo de transacción inválido: {other}"
            ))),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(ValueRef::Text(self.as_str().as_bytes())))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A transaction as stored in the database.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    /// When the transaction happened, in UTC.
    pub date: OffsetDateTime,
    pub kind: TransactionKind,
    pub amount: f64,
    pub bank_id: BankId,
    pub client_id: Option<ClientId>,
    pub check_id: Option<CheckId>,
    /// The session that owns the transaction, `None` for base data.
    pub session_id: Option<String>,
}

/// A transaction with the names of the bank, client and check it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    #[serde(rename = "transaccion_id")]
    pub id: TransactionId,
    #[serde(rename = "fecha", with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(rename = "tipo")]
    pub kind: TransactionKind,
    #[serde(rename = "monto")]
    pub amount: f64,
    #[serde(rename = "banco_id")]
    pub bank_id: BankId,
    #[serde(rename = "cliente_id")]
    pub client_id: Option<ClientId>,
    #[serde(rename = "cheque_id")]
    pub check_id: Option<CheckId>,
    pub session_id: Option<String>,
    #[serde(rename = "nombre_banco")]
    pub bank_name: String,
    /// The client's first and last name separated by a space.
    #[serde(rename = "nombre_cliente")]
    pub client_name: Option<String>,
    #[serde(rename = "numero_cheque")]
    pub check_number: Option<String>,
}

/// The body sent after creating or updating a transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub transaction: TransactionView,
}

/// The state needed by the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table.
///
/// Deleting a bank deletes its transactions. Deleting a client or check
/// leaves the transaction without one.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transacciones (
            transaccion_id INTEGER PRIMARY KEY,
            fecha TEXT NOT NULL,
            tipo TEXT NOT NULL,
            monto REAL NOT NULL,
            banco_id INTEGER NOT NULL REFERENCES bancos(banco_id) ON DELETE CASCADE,
            cliente_id INTEGER REFERENCES clientes(cliente_id) ON DELETE SET NULL,
            cheque_id INTEGER REFERENCES cheques(cheque_id) ON DELETE SET NULL,
            session_id TEXT
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transacciones_session_fecha
        ON transacciones(session_id, fecha)",
        (),
    )?;

    Ok(())
}

fn get_date(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let text: String = row.get(index)?;

    parse_stored_date(&text)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

/// Map a row with the columns of the transaction table, in order.
pub fn map_row_to_transaction(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        date: get_date(row, 1)?,
        kind: row.get(2)?,
        amount: row.get(3)?,
        bank_id: row.get(4)?,
        client_id: row.get(5)?,
        check_id: row.get(6)?,
        session_id: row.get(7)?,
    })
}

/// The query for [TransactionView]s, to be followed by a `WHERE` clause.
pub(super) const SELECT_TRANSACTION_VIEW: &str = "SELECT
        t.transaccion_id, t.fecha, t.tipo, t.monto, t.banco_id, t.cliente_id,
        t.cheque_id, t.session_id,
        b.nombre,
        TRIM(c.nombre || ' ' || COALESCE(c.apellido, '')),
        ch.numero
    FROM transacciones t
    INNER JOIN bancos b ON b.banco_id = t.banco_id
    LEFT JOIN clientes c ON c.cliente_id = t.cliente_id
    LEFT JOIN cheques ch ON ch.cheque_id = t.cheque_id";

/// Map a row selected with [SELECT_TRANSACTION_VIEW].
pub fn map_row_to_transaction_view(row: &Row) -> Result<TransactionView, rusqlite::Error> {
    Ok(TransactionView {
        id: row.get(0)?,
        date: get_date(row, 1)?,
        kind: row.get(2)?,
        amount: row.get(3)?,
        bank_id: row.get(4)?,
        client_id: row.get(5)?,
        check_id: row.get(6)?,
        session_id: row.get(7)?,
        bank_name: row.get(8)?,
        client_name: row.get(9)?,
        check_number: row.get(10)?,
    })
}

/// Get a transaction by its id, regardless of who owns it.
///
/// # Errors
/// Returns [Error::NotFound] if there is no transaction with `id`.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .query_one(
            "SELECT transaccion_id, fecha, tipo, monto, banco_id, cliente_id, cheque_id, session_id
            FROM transacciones WHERE transaccion_id = ?1",
            params![id],
            map_row_to_transaction,
        )
        .map_err(|error| Error::from(error).or_not_found(Resource::Transaction))
}

/// Get a transaction with the names of what it references.
///
/// # Errors
/// Returns [Error::NotFound] if there is no transaction with `id`.
pub fn get_transaction_view(
    id: TransactionId,
    connection: &Connection,
) -> Result<TransactionView, Error> {
    connection
        .query_one(
            &format!("{SELECT_TRANSACTION_VIEW} WHERE t.transaccion_id = ?1"),
            params![id],
            map_row_to_transaction_view,
        )
        .map_err(|error| Error::from(error).or_not_found(Resource::Transaction))
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        error::Resource,
        test_utils::{
            insert_base_bank, insert_base_check, insert_base_client, insert_base_transaction,
            must_create_test_connection,
        },
    };

    use super::{TransactionKind, create_transaction_table, get_transaction, get_transaction_view};

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_transaction_table(&connection));
    }

    #[test]
    fn kind_names_round_trip_through_json() {
        let json = serde_json::to_string(&TransactionKind::GastosMantenimiento).unwrap();

        assert_eq!(json, "\"gastos_mantenimiento\"");
        assert_eq!(
            "gastos_mantenimiento".parse(),
            Ok(TransactionKind::GastosMantenimiento)
        );
    }

    #[test]
    fn unknown_kind_is_invalid_input() {
        assert!(matches!(
            "regalo".parse::<TransactionKind>(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn view_includes_names_of_references() {
        let connection = must_create_test_connection();
        let bank_id = insert_base_bank("BROU", 0.0, &connection);
        let client_id = insert_base_client("Juan", Some("Perez"), &connection);
        let check_id = insert_base_check("1001", &connection);
        let id = insert_base_transaction(
            TransactionKind::PagoCheque,
            500.0,
            bank_id,
            Some(client_id),
            Some(check_id),
            &connection,
        );

        let view = get_transaction_view(id, &connection).unwrap();

        assert_eq!(view.bank_name, "BROU");
        assert_eq!(view.client_name.as_deref(), Some("Juan Perez"));
        assert_eq!(view.check_number.as_deref(), Some("1001"));
        assert_eq!(view.date, datetime!(2025-01-01 00:00 UTC));
    }

    #[test]
    fn view_of_client_without_last_name_has_no_trailing_space() {
        let connection = must_create_test_connection();
        let bank_id = insert_base_bank("BROU", 0.0, &connection);
        let client_id = insert_base_client("Acme", None, &connection);
        let id = insert_base_transaction(
            TransactionKind::Pago,
            1.0,
            bank_id,
            Some(client_id),
            None,
            &connection,
        );

        let view = get_transaction_view(id, &connection).unwrap();

        assert_eq!(view.client_name.as_deref(), Some("Acme"));
        assert_eq!(view.check_number, None);
    }

    #[test]
    fn missing_transaction_is_not_found() {
        let connection = must_create_test_connection();

        assert_eq!(
            get_transaction(1, &connection),
            Err(Error::NotFound(Resource::Transaction))
        );
    }
}
