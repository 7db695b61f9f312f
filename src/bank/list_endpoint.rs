//! Defines the endpoint for listing the banks visible to a session.

use axum::{Json, extract::State};
use rusqlite::{Connection, params};

use crate::{
    Error,
    bank::{Bank, BankState, map_row_to_bank},
    db::lock_connection,
    session::SessionId,
};

/// A route handler for listing the base banks and the banks owned by the caller's session.
pub async fn list_banks_endpoint(
    State(state): State<BankState>,
    session_id: SessionId,
) -> Result<Json<Vec<Bank>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_banks(&session_id, &connection).map(Json)
}

/// Get the banks with no owner or owned by `session_id`, ordered by id.
pub fn list_banks(session_id: &SessionId, connection: &Connection) -> Result<Vec<Bank>, Error> {
    let mut statement = connection.prepare(
        "SELECT banco_id, nombre, saldo_total, session_id FROM bancos
        WHERE session_id IS NULL OR session_id = ?1
        ORDER BY banco_id",
    )?;

    let banks = statement
        .query_map(params![session_id.as_str()], map_row_to_bank)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(banks)
}

#[cfg(test)]
mod tests {
    use crate::{
        bank::{Bank, BankForm, create_bank, list_banks},
        session::SessionId,
        test_utils::{insert_base_bank, must_create_test_connection},
    };

    #[test]
    fn lists_base_and_own_banks_only() {
        let connection = must_create_test_connection();
        let base_id = insert_base_bank("Base", 100.0, &connection);
        let mine = create_bank(
            &BankForm {
                name: Some("Mío".to_owned()),
                balance: Some(1.0),
            },
            &SessionId::new("a"),
            &connection,
        )
        .unwrap();
        create_bank(
            &BankForm {
                name: Some("Ajeno".to_owned()),
                balance: Some(2.0),
            },
            &SessionId::new("b"),
            &connection,
        )
        .unwrap();

        let banks = list_banks(&SessionId::new("a"), &connection).unwrap();

        assert_eq!(
            banks,
            vec![
                Bank {
                    id: base_id,
                    name: "Base".to_owned(),
                    balance: 100.0,
                    session_id: None,
                },
                mine,
            ]
        );
    }
}
