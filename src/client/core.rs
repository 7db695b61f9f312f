use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    error::Resource,
    name::same_name,
    session::{SessionId, is_visible},
};

pub type ClientId = DatabaseId;

/// A person or business that money is paid to or received from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// The id for the client.
    #[serde(rename = "cliente_id")]
    pub id: ClientId,
    /// The first name, or the whole name of a business.
    #[serde(rename = "nombre")]
    pub first_name: String,
    /// The last name, if any.
    #[serde(rename = "apellido")]
    pub last_name: Option<String>,
    /// The session that owns the client, `None` for base data.
    pub session_id: Option<String>,
}

impl Client {
    /// The first and last name separated by a space.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last_name) => format!("{} {last_name}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

/// The state needed by the client endpoints.
#[derive(Debug, Clone)]
pub struct ClientState {
    /// The database connection for managing clients.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ClientState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating or updating a client.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ClientForm {
    #[serde(rename = "nombre")]
    pub first_name: Option<String>,
    #[serde(rename = "apellido")]
    pub last_name: Option<String>,
}

impl ClientForm {
    /// Get the trimmed first name and last name. A blank last name becomes `None`.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if the first name is missing or blank.
    pub(super) fn validate(&self) -> Result<(String, Option<String>), Error> {
        let first_name = non_blank(self.first_name.as_deref())
            .ok_or_else(|| Error::InvalidInput("Faltan datos: nombre".to_owned()))?;

        Ok((first_name, non_blank(self.last_name.as_deref())))
    }
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

pub fn create_client_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS clientes (
            cliente_id INTEGER PRIMARY KEY,
            nombre TEXT NOT NULL,
            apellido TEXT,
            session_id TEXT
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_client(row: &Row) -> Result<Client, rusqlite::Error> {
    Ok(Client {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        session_id: row.get(3)?,
    })
}

/// Get a client by its id, regardless of who owns it.
///
/// # Errors
/// Returns [Error::NotFound] if there is no client with `id`.
pub fn get_client(id: ClientId, connection: &Connection) -> Result<Client, Error> {
    connection
        .query_one(
            "SELECT cliente_id, nombre, apellido, session_id FROM clientes WHERE cliente_id = ?1",
            params![id],
            map_row_to_client,
        )
        .map_err(|error| Error::from(error).or_not_found(Resource::Client))
}

/// Get a client that `session_id` may reference from its own records.
///
/// # Errors
/// Returns [Error::InvalidClient] if the client does not exist or belongs to
/// another session.
pub fn get_visible_client(
    id: ClientId,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Client, Error> {
    match get_client(id, connection) {
        Ok(client) if is_visible(client.session_id.as_deref(), session_id) => Ok(client),
        Ok(_) | Err(Error::NotFound(_)) => Err(Error::InvalidClient(id)),
        Err(error) => Err(error),
    }
}

/// Find the first client visible to `session_id` whose first name is
/// `first_name` and whose last name is either `last_name` or empty.
///
/// This is a loose match on names, so two different people whose names split
/// the same way are treated as one client.
pub fn find_client_by_name(
    first_name: &str,
    last_name: Option<&str>,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Option<Client>, Error> {
    connection
        .query_row(
            "SELECT cliente_id, nombre, apellido, session_id FROM clientes
            WHERE nombre = ?1
            AND (apellido = ?2 OR apellido IS NULL)
            AND (session_id IS NULL OR session_id = ?3)
            ORDER BY cliente_id
            LIMIT 1",
            params![first_name, last_name, session_id.as_str()],
            map_row_to_client,
        )
        .optional()
        .map_err(Error::from)
}

/// Insert a client owned by `session_id` without any validation.
pub fn insert_client(
    first_name: &str,
    last_name: Option<&str>,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Client, Error> {
    connection.execute(
        "INSERT INTO clientes (nombre, apellido, session_id) VALUES (?1, ?2, ?3)",
        params![first_name, last_name, session_id.as_str()],
    )?;

    Ok(Client {
        id: connection.last_insert_rowid(),
        first_name: first_name.to_owned(),
        last_name: last_name.map(str::to_owned),
        session_id: Some(session_id.to_string()),
    })
}

/// Whether a client with the same first and last name, ignoring case, is visible to `session_id`.
pub(super) fn client_name_taken(
    first_name: &str,
    last_name: Option<&str>,
    session_id: &SessionId,
    exclude: Option<ClientId>,
    connection: &Connection,
) -> Result<bool, Error> {
    let mut statement = connection.prepare(
        "SELECT nombre, COALESCE(apellido, '') FROM clientes
        WHERE (session_id IS NULL OR session_id = ?1)
        AND cliente_id IS NOT ?2",
    )?;
    let names = statement.query_map(params![session_id.as_str(), exclude], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    for taken in names {
        let (taken_first, taken_last) = taken?;
        if same_name(&taken_first, first_name) && same_name(&taken_last, last_name.unwrap_or("")) {
            return Ok(true);
        }
    }

    Ok(false)
}
