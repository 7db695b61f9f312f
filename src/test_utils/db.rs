use rusqlite::{Connection, params};

use crate::{
    bank::BankId,
    check::CheckId,
    client::ClientId,
    db::initialize,
    transaction::{TransactionId, TransactionKind},
};

#[track_caller]
pub(crate) fn must_create_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}

/// Insert a bank that belongs to no session.
#[track_caller]
pub(crate) fn insert_base_bank(name: &str, balance: f64, connection: &Connection) -> BankId {
    connection
        .execute(
            "INSERT INTO bancos (nombre, saldo_total, session_id) VALUES (?1, ?2, NULL)",
            params![name, balance],
        )
        .expect("Could not insert base bank.");

    connection.last_insert_rowid()
}

#[track_caller]
pub(crate) fn insert_base_client(
    first_name: &str,
    last_name: Option<&str>,
    connection: &Connection,
) -> ClientId {
    connection
        .execute(
            "INSERT INTO clientes (nombre, apellido, session_id) VALUES (?1, ?2, NULL)",
            params![first_name, last_name],
        )
        .expect("Could not insert base client.");

    connection.last_insert_rowid()
}

#[track_caller]
pub(crate) fn insert_base_check(number: &str, connection: &Connection) -> CheckId {
    connection
        .execute(
            "INSERT INTO cheques (numero, session_id) VALUES (?1, NULL)",
            params![number],
        )
        .expect("Could not insert base check.");

    connection.last_insert_rowid()
}

/// Insert a transaction dated 2025-01-01 that belongs to no session.
#[track_caller]
pub(crate) fn insert_base_transaction(
    kind: TransactionKind,
    amount: f64,
    bank_id: BankId,
    client_id: Option<ClientId>,
    check_id: Option<CheckId>,
    connection: &Connection,
) -> TransactionId {
    connection
        .execute(
            "INSERT INTO transacciones (fecha, tipo, monto, banco_id, cliente_id, cheque_id, session_id)
            VALUES ('2025-01-01T00:00:00Z', ?1, ?2, ?3, ?4, ?5, NULL)",
            params![kind, amount, bank_id, client_id, check_id],
        )
        .expect("Could not insert base transaction.");

    connection.last_insert_rowid()
}
