//! Defines the endpoint for updating a client.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::{Connection, params};

use crate::{
    Error,
    client::{Client, ClientForm, ClientId, ClientState, core::client_name_taken, get_client},
    db::lock_connection,
    error::Resource,
    json::AppJson,
    session::{SessionId, ensure_owner},
};

/// A route handler for updating a client owned by the caller's session.
pub async fn edit_client_endpoint(
    State(state): State<ClientState>,
    session_id: SessionId,
    Path(client_id): Path<ClientId>,
    AppJson(form): AppJson<ClientForm>,
) -> Result<Json<Client>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    edit_client(client_id, &form, &session_id, &connection).map(Json)
}

/// Update the names of the client `id`.
///
/// # Errors
/// Returns [Error::NotFound], [Error::BaseRecord] or [Error::ForeignSession]
/// before looking at `form`, then the same errors as [crate::client::create_client].
pub fn edit_client(
    id: ClientId,
    form: &ClientForm,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Client, Error> {
    let client = get_client(id, connection)?;
    ensure_owner(client.session_id.as_deref(), session_id, Resource::Client)?;

    let (first_name, last_name) = form.validate()?;

    if client_name_taken(
        &first_name,
        last_name.as_deref(),
        session_id,
        Some(id),
        connection,
    )? {
        return Err(Error::DuplicateClientName(first_name));
    }

    connection.execute(
        "UPDATE clientes SET nombre = ?1, apellido = ?2 WHERE cliente_id = ?3",
        params![first_name, last_name, id],
    )?;

    Ok(Client {
        id,
        first_name,
        last_name,
        session_id: client.session_id,
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        client::{ClientForm, edit_client, get_client, insert_client},
        error::Resource,
        session::SessionId,
        test_utils::{insert_base_client, must_create_test_connection},
    };

    fn form(first_name: &str, last_name: Option<&str>) -> ClientForm {
        ClientForm {
            first_name: Some(first_name.to_owned()),
            last_name: last_name.map(str::to_owned),
        }
    }

    #[test]
    fn owner_can_rename_client() {
        let connection = must_create_test_connection();
        let session_id = SessionId::new("a");
        let client = insert_client("Jaun", None, &session_id, &connection).unwrap();

        let updated = edit_client(
            client.id,
            &form("Juan", Some("Perez")),
            &session_id,
            &connection,
        )
        .unwrap();

        assert_eq!(updated.full_name(), "Juan Perez");
        assert_eq!(get_client(client.id, &connection), Ok(updated));
    }

    #[test]
    fn ownership_is_checked_before_validation() {
        let connection = must_create_test_connection();
        let id = insert_base_client("Base", None, &connection);

        let result = edit_client(id, &ClientForm::default(), &SessionId::new("a"), &connection);

        assert_eq!(result, Err(Error::BaseRecord(Resource::Client)));
    }

    #[test]
    fn other_session_cannot_edit() {
        let connection = must_create_test_connection();
        let client = insert_client("Ana", None, &SessionId::new("a"), &connection).unwrap();

        let result = edit_client(client.id, &form("Eva", None), &SessionId::new("b"), &connection);

        assert_eq!(result, Err(Error::ForeignSession(Resource::Client)));
    }

    #[test]
    fn cannot_take_name_of_visible_client() {
        let connection = must_create_test_connection();
        let session_id = SessionId::new("a");
        insert_base_client("Acme", None, &connection);
        let client = insert_client("Other", None, &session_id, &connection).unwrap();

        let result = edit_client(client.id, &form("acme", None), &session_id, &connection);

        assert_eq!(result, Err(Error::DuplicateClientName("acme".to_owned())));
    }
}
