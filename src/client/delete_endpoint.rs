//! Defines the endpoint for deleting a client.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};
use serde_json::{Value, json};

use crate::{
    Error,
    client::{ClientId, ClientState, get_client},
    db::lock_connection,
    error::Resource,
    session::{SessionId, ensure_owner},
};

/// A route handler for deleting a client owned by the caller's session.
///
/// Transactions that named the client are kept with no client.
pub async fn delete_client_endpoint(
    State(state): State<ClientState>,
    session_id: SessionId,
    Path(client_id): Path<ClientId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_client(client_id, &session_id, &connection)?;

    Ok(Json(json!({ "message": "Cliente eliminado con éxito" })))
}

pub fn delete_client(
    id: ClientId,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<(), Error> {
    let client = get_client(id, connection)?;
    ensure_owner(client.session_id.as_deref(), session_id, Resource::Client)?;

    connection.execute("DELETE FROM clientes WHERE cliente_id = ?1", params![id])?;

    Ok(())
}
