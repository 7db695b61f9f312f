//! Defines the endpoint for listing the clients visible to a session.

use axum::{Json, extract::State};
use rusqlite::{Connection, params};

use crate::{
    Error,
    client::{Client, ClientState, map_row_to_client},
    db::lock_connection,
    session::SessionId,
};

/// A route handler for listing the base clients and the clients owned by the caller's session.
pub async fn list_clients_endpoint(
    State(state): State<ClientState>,
    session_id: SessionId,
) -> Result<Json<Vec<Client>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_clients(&session_id, &connection).map(Json)
}

pub fn list_clients(session_id: &SessionId, connection: &Connection) -> Result<Vec<Client>, Error> {
    let mut statement = connection.prepare(
        "SELECT cliente_id, nombre, apellido, session_id FROM clientes
        WHERE session_id IS NULL OR session_id = ?1
        ORDER BY cliente_id",
    )?;

    let clients = statement
        .query_map(params![session_id.as_str()], map_row_to_client)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(clients)
}
