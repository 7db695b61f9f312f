use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    error::Resource,
    name::same_name,
    session::{SessionId, is_visible},
};

pub type BankId = DatabaseId;

/// A bank account and its running balance.
///
/// The balance is maintained by the user and is not recomputed from the
/// account's transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    /// The id for the bank.
    #[serde(rename = "banco_id")]
    pub id: BankId,
    /// The display name, unique among the banks visible to a session.
    #[serde(rename = "nombre")]
    pub name: String,
    /// The balance.
    #[serde(rename = "saldo_total")]
    pub balance: f64,
    /// The session that owns the bank, `None` for base data.
    pub session_id: Option<String>,
}

/// The state needed by the bank endpoints.
#[derive(Debug, Clone)]
pub struct BankState {
    /// The database connection for managing banks.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BankState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating or updating a bank.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct BankForm {
    /// The bank name.
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    /// The balance.
    #[serde(rename = "saldo_total")]
    pub balance: Option<f64>,
}

impl BankForm {
    /// Get the trimmed name and the balance.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if the name is missing or blank, or if the
    /// balance is missing or not a finite number.
    pub(super) fn validate(&self) -> Result<(String, f64), Error> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        match (name, self.balance) {
            (Some(name), Some(balance)) if balance.is_finite() => Ok((name.to_owned(), balance)),
            _ => Err(Error::InvalidInput(
                "Faltan datos: nombre o saldo_total".to_owned(),
            )),
        }
    }
}

pub fn create_bank_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS bancos (
            banco_id INTEGER PRIMARY KEY,
            nombre TEXT NOT NULL,
            saldo_total REAL NOT NULL DEFAULT 0,
            session_id TEXT
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_bank(row: &Row) -> Result<Bank, rusqlite::Error> {
    Ok(Bank {
        id: row.get(0)?,
        name: row.get(1)?,
        balance: row.get(2)?,
        session_id: row.get(3)?,
    })
}

/// Get a bank by its id, regardless of who owns it.
///
/// # Errors
/// Returns [Error::NotFound] if there is no bank with `id`, or an
/// [Error::SqlError] if there is some other SQL error.
pub fn get_bank(id: BankId, connection: &Connection) -> Result<Bank, Error> {
    connection
        .query_one(
            "SELECT banco_id, nombre, saldo_total, session_id FROM bancos WHERE banco_id = ?1",
            params![id],
            map_row_to_bank,
        )
        .map_err(|error| Error::from(error).or_not_found(Resource::Bank))
}

/// Get a bank that `session_id` may reference from its own records.
///
/// # Errors
/// Returns [Error::InvalidBank] if the bank does not exist or belongs to
/// another session.
pub fn get_visible_bank(
    id: BankId,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Bank, Error> {
    match get_bank(id, connection) {
        Ok(bank) if is_visible(bank.session_id.as_deref(), session_id) => Ok(bank),
        Ok(_) | Err(Error::NotFound(_)) => Err(Error::InvalidBank(id)),
        Err(error) => Err(error),
    }
}

/// Whether a bank named `name`, ignoring case, is visible to `session_id`.
///
/// The bank with the id `exclude` is skipped so that a bank can keep its own name when updated.
pub(super) fn bank_name_taken(
    name: &str,
    session_id: &SessionId,
    exclude: Option<BankId>,
    connection: &Connection,
) -> Result<bool, Error> {
    let mut statement = connection.prepare(
        "SELECT nombre FROM bancos
        WHERE (session_id IS NULL OR session_id = ?1)
        AND banco_id IS NOT ?2",
    )?;
    let names = statement.query_map(params![session_id.as_str(), exclude], |row| {
        row.get::<_, String>(0)
    })?;

    for taken in names {
        if same_name(&taken?, name) {
            return Ok(true);
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        bank::{BankForm, get_bank, get_visible_bank},
        db::initialize,
        error::Resource,
        session::SessionId,
        test_utils::insert_base_bank,
    };

    use super::{bank_name_taken, create_bank_table};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_bank_table(&connection));
    }

    #[test]
    fn get_missing_bank_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(
            get_bank(42, &connection),
            Err(Error::NotFound(Resource::Bank))
        );
    }

    #[test]
    fn other_sessions_banks_are_not_visible() {
        let connection = get_test_connection();
        connection
            .execute(
                "INSERT INTO bancos (nombre, saldo_total, session_id) VALUES ('Privado', 0, 'b')",
                (),
            )
            .unwrap();
        let id = connection.last_insert_rowid();

        let result = get_visible_bank(id, &SessionId::new("a"), &connection);

        assert_eq!(result, Err(Error::InvalidBank(id)));
    }

    #[test]
    fn name_check_ignores_case_and_excluded_bank() {
        let connection = get_test_connection();
        let id = insert_base_bank("Banco Nación", 0.0, &connection);
        let session_id = SessionId::new("a");

        assert_eq!(
            bank_name_taken("banco nación", &session_id, None, &connection),
            Ok(true)
        );
        assert_eq!(
            bank_name_taken("banco nación", &session_id, Some(id), &connection),
            Ok(false)
        );
    }

    #[test]
    fn name_check_folds_accented_letters() {
        let connection = get_test_connection();
        insert_base_bank("Itaú", 0.0, &connection);

        assert_eq!(
            bank_name_taken("ITAÚ", &SessionId::new("a"), None, &connection),
            Ok(true)
        );
    }

    #[test]
    fn form_requires_name_and_balance() {
        let missing_balance = BankForm {
            name: Some("BROU".to_owned()),
            balance: None,
        };
        let blank_name = BankForm {
            name: Some("   ".to_owned()),
            balance: Some(10.0),
        };

        assert!(matches!(
            missing_balance.validate(),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(blank_name.validate(), Err(Error::InvalidInput(_))));
    }
}
