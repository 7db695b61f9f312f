//! Defines the endpoint for listing the checks visible to a session.

use axum::{Json, extract::State};
use rusqlite::{Connection, params};

use crate::{
    Error,
    check::{Check, CheckState, map_row_to_check},
    db::lock_connection,
    session::SessionId,
};

/// A route handler for listing the base checks and the checks owned by the caller's session.
pub async fn list_checks_endpoint(
    State(state): State<CheckState>,
    session_id: SessionId,
) -> Result<Json<Vec<Check>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_checks(&session_id, &connection).map(Json)
}

pub fn list_checks(session_id: &SessionId, connection: &Connection) -> Result<Vec<Check>, Error> {
    let mut statement = connection.prepare(
        "SELECT cheque_id, numero, session_id FROM cheques
        WHERE session_id IS NULL OR session_id = ?1
        ORDER BY cheque_id",
    )?;

    let checks = statement
        .query_map(params![session_id.as_str()], map_row_to_check)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(checks)
}

#[cfg(test)]
mod tests {
    use crate::{
        check::{CheckNumber, insert_check, list_checks},
        session::SessionId,
        test_utils::{insert_base_check, must_create_test_connection},
    };

    #[test]
    fn lists_base_and_own_checks() {
        let connection = must_create_test_connection();
        insert_base_check("1", &connection);
        insert_check(&CheckNumber::new("2"), &SessionId::new("a"), &connection).unwrap();
        insert_check(&CheckNumber::new("3"), &SessionId::new("b"), &connection).unwrap();

        let numbers: Vec<String> = list_checks(&SessionId::new("a"), &connection)
            .unwrap()
            .into_iter()
            .map(|check| check.number)
            .collect();

        assert_eq!(numbers, ["1", "2"]);
    }
}
