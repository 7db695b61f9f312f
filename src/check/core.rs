use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    AppState, Error,
    database_id::{DatabaseId, RowsAffected},
    error::Resource,
    session::SessionId,
};

pub type CheckId = DatabaseId;

/// A paper check, identified to people by its printed number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    /// The id for the check.
    #[serde(rename = "cheque_id")]
    pub id: CheckId,
    /// The number printed on the check.
    #[serde(rename = "numero")]
    pub number: String,
    /// The session that owns the check, `None` for base data.
    pub session_id: Option<String>,
}

/// A check number as sent by clients, either a JSON string or a JSON number.
///
/// Surrounding whitespace is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CheckNumber(String);

impl CheckNumber {
    /// Create a check number from text.
    pub fn new(number: impl AsRef<str>) -> Self {
        Self(number.as_ref().trim().to_owned())
    }

    /// The number as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the number is blank, which means no check.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for CheckNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for CheckNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawCheckNumber {
            Text(String),
            Number(u64),
        }

        Ok(match RawCheckNumber::deserialize(deserializer)? {
            RawCheckNumber::Text(text) => CheckNumber::new(text),
            RawCheckNumber::Number(number) => CheckNumber(number.to_string()),
        })
    }
}

/// The state needed by the check endpoints.
#[derive(Debug, Clone)]
pub struct CheckState {
    /// The database connection for managing checks.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CheckState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating or updating a check.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct CheckForm {
    #[serde(rename = "numero")]
    pub number: Option<CheckNumber>,
}

impl CheckForm {
    /// # Errors
    /// Returns [Error::InvalidInput] if the number is missing or blank.
    pub(super) fn validate(&self) -> Result<CheckNumber, Error> {
        self.number
            .clone()
            .filter(|number| !number.is_empty())
            .ok_or_else(|| Error::InvalidInput("Número de cheque requerido".to_owned()))
    }
}

pub fn create_check_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS cheques (
            cheque_id INTEGER PRIMARY KEY,
            numero TEXT NOT NULL,
            session_id TEXT
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_check(row: &Row) -> Result<Check, rusqlite::Error> {
    Ok(Check {
        id: row.get(0)?,
        number: row.get(1)?,
        session_id: row.get(2)?,
    })
}

/// Get a check by its id, regardless of who owns it.
///
/// # Errors
/// Returns [Error::NotFound] if there is no check with `id`.
pub fn get_check(id: CheckId, connection: &Connection) -> Result<Check, Error> {
    connection
        .query_one(
            "SELECT cheque_id, numero, session_id FROM cheques WHERE cheque_id = ?1",
            params![id],
            map_row_to_check,
        )
        .map_err(|error| Error::from(error).or_not_found(Resource::Check))
}

/// Find the first check visible to `session_id` with the number `number`.
pub fn find_check_by_number(
    number: &CheckNumber,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Option<Check>, Error> {
    connection
        .query_row(
            "SELECT cheque_id, numero, session_id FROM cheques
            WHERE numero = ?1 AND (session_id IS NULL OR session_id = ?2)
            ORDER BY cheque_id
            LIMIT 1",
            params![number.as_str(), session_id.as_str()],
            map_row_to_check,
        )
        .optional()
        .map_err(Error::from)
}

/// Insert a check owned by `session_id` without any validation.
pub fn insert_check(
    number: &CheckNumber,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Check, Error> {
    connection.execute(
        "INSERT INTO cheques (numero, session_id) VALUES (?1, ?2)",
        params![number.as_str(), session_id.as_str()],
    )?;

    Ok(Check {
        id: connection.last_insert_rowid(),
        number: number.to_string(),
        session_id: Some(session_id.to_string()),
    })
}

/// Set the number of the check `id`, regardless of who owns it.
///
/// # Errors
/// Returns [Error::NotFound] if there is no check with `id`.
pub fn update_check_number(
    id: CheckId,
    number: &CheckNumber,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected: RowsAffected = connection.execute(
        "UPDATE cheques SET numero = ?1 WHERE cheque_id = ?2",
        params![number.as_str(), id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound(Resource::Check));
    }

    Ok(())
}

/// Whether a check numbered `number` is visible to `session_id`, skipping the check `exclude`.
pub fn check_number_taken(
    number: &CheckNumber,
    session_id: &SessionId,
    exclude: Option<CheckId>,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS (
                SELECT 1 FROM cheques
                WHERE numero = ?1
                AND (session_id IS NULL OR session_id = ?2)
                AND cheque_id IS NOT ?3
            )",
            params![number.as_str(), session_id.as_str(), exclude],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use crate::{
        Error,
        check::{CheckForm, CheckNumber, find_check_by_number, insert_check, update_check_number},
        error::Resource,
        session::SessionId,
        test_utils::{insert_base_check, must_create_test_connection},
    };

    #[derive(Deserialize)]
    struct Body {
        numero: CheckNumber,
    }

    #[test]
    fn check_number_accepts_strings_and_numbers() {
        let text: Body = serde_json::from_str(r#"{"numero": " 1001 "}"#).unwrap();
        let number: Body = serde_json::from_str(r#"{"numero": 1001}"#).unwrap();

        assert_eq!(text.numero, CheckNumber::new("1001"));
        assert_eq!(number.numero, CheckNumber::new("1001"));
    }

    #[test]
    fn blank_number_is_rejected() {
        let form = CheckForm {
            number: Some(CheckNumber::new("   ")),
        };

        assert_eq!(
            form.validate(),
            Err(Error::InvalidInput("Número de cheque requerido".to_owned()))
        );
    }

    #[test]
    fn finds_base_check_by_number() {
        let connection = must_create_test_connection();
        let id = insert_base_check("555", &connection);

        let found =
            find_check_by_number(&CheckNumber::new("555"), &SessionId::new("a"), &connection)
                .unwrap();

        assert_eq!(found.map(|check| check.id), Some(id));
    }

    #[test]
    fn does_not_find_checks_of_other_sessions() {
        let connection = must_create_test_connection();
        insert_check(&CheckNumber::new("555"), &SessionId::new("b"), &connection).unwrap();

        let found =
            find_check_by_number(&CheckNumber::new("555"), &SessionId::new("a"), &connection)
                .unwrap();

        assert_eq!(found, None);
    }

    #[test]
    fn updating_missing_check_is_not_found() {
        let connection = must_create_test_connection();

        assert_eq!(
            update_check_number(3, &CheckNumber::new("1"), &connection),
            Err(Error::NotFound(Resource::Check))
        );
    }
}
