//! Defines the endpoint for listing the transactions visible to a session.

use axum::{Json, extract::State};
use rusqlite::{Connection, params};

use crate::{
    Error,
    db::lock_connection,
    session::SessionId,
    transaction::{
        TransactionState, TransactionView, core::SELECT_TRANSACTION_VIEW,
        map_row_to_transaction_view,
    },
};

/// A route handler for listing the base transactions and the transactions
/// owned by the caller's session, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    session_id: SessionId,
) -> Result<Json<Vec<TransactionView>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_transactions(&session_id, &connection).map(Json)
}

pub fn list_transactions(
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Vec<TransactionView>, Error> {
    let mut statement = connection.prepare(&format!(
        "{SELECT_TRANSACTION_VIEW}
        WHERE t.session_id IS NULL OR t.session_id = ?1
        ORDER BY t.fecha DESC, t.transaccion_id DESC"
    ))?;

    let transactions = statement
        .query_map(params![session_id.as_str()], map_row_to_transaction_view)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use crate::{
        session::SessionId,
        test_utils::{insert_base_bank, insert_base_transaction, must_create_test_connection},
        transaction::{CreateTransactionForm, TransactionKind, create_transaction, list_transactions},
    };

    #[test]
    fn lists_newest_first_and_hides_other_sessions() {
        let connection = must_create_test_connection();
        let bank_id = insert_base_bank("BROU", 0.0, &connection);
        let base_id =
            insert_base_transaction(TransactionKind::Impuesto, 3.0, bank_id, None, None, &connection);
        let form = |date: &str| CreateTransactionForm {
            date: Some(date.to_owned()),
            kind: Some("pago".to_owned()),
            amount: Some(1.0),
            bank_id: Some(bank_id),
            ..Default::default()
        };
        let newest = create_transaction(&form("2025-06-01"), &SessionId::new("a"), &connection)
            .unwrap();
        create_transaction(&form("2025-07-01"), &SessionId::new("b"), &connection).unwrap();

        let ids: Vec<i64> = list_transactions(&SessionId::new("a"), &connection)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();

        assert_eq!(ids, [newest.id, base_id]);
    }
}
