//! The daily quota of changes each session may make in demo mode.

use std::sync::{Arc, Mutex};

use axum::{extract::FromRef, http::Method};
use rusqlite::{Connection, params};
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{AppState, Error, session::SessionId};

/// How many changes a session may make per day in demo mode.
pub const MAX_DAILY_DEMO_ACTIONS: u32 = 30;

/// A change counted against the demo quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoAction {
    /// A new record, made with `POST`.
    Add,
    /// A change to a record, made with `PUT`.
    Edit,
    /// A removed record, made with `DELETE`.
    Delete,
}

impl DemoAction {
    /// The action for a request method, `None` for methods that do not change data.
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::POST => Some(DemoAction::Add),
            Method::PUT => Some(DemoAction::Edit),
            Method::DELETE => Some(DemoAction::Delete),
            _ => None,
        }
    }

    /// The name stored in the action log.
    pub fn as_str(self) -> &'static str {
        match self {
            DemoAction::Add => "add",
            DemoAction::Edit => "edit",
            DemoAction::Delete => "delete",
        }
    }
}

/// The state needed for counting demo actions.
#[derive(Debug, Clone)]
pub struct DemoState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// Whether the quota is enforced.
    pub demo_mode: bool,
    /// The local timezone as a canonical timezone name. Quotas reset at local midnight.
    pub local_timezone: String,
}

impl FromRef<AppState> for DemoState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            demo_mode: state.demo_mode,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

pub fn create_demo_action_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS acciones_demo (
            accion_id INTEGER PRIMARY KEY,
            ip TEXT NOT NULL,
            accion TEXT NOT NULL,
            session_id TEXT NOT NULL,
            fecha TEXT NOT NULL,
            dia TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_acciones_demo_session_dia
        ON acciones_demo(session_id, dia)",
        (),
    )?;

    Ok(())
}

/// Count the actions of every kind that `session_id` made on the local date `day`.
pub fn count_actions_on(
    session_id: &SessionId,
    day: Date,
    connection: &Connection,
) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(*) FROM acciones_demo WHERE session_id = ?1 AND dia = ?2",
            params![session_id.as_str(), day],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// How many more actions `session_id` may make on the local date `day`.
pub fn remaining_actions(
    session_id: &SessionId,
    day: Date,
    connection: &Connection,
) -> Result<u32, Error> {
    count_actions_on(session_id, day, connection)
        .map(|count| MAX_DAILY_DEMO_ACTIONS.saturating_sub(count))
}

/// Log an action by `session_id` at the local time `now` if the session has
/// not used up its quota for the day.
///
/// Returns the number of actions left after this one.
///
/// # Errors
/// Returns [Error::QuotaExceeded] if the session already made
/// [MAX_DAILY_DEMO_ACTIONS] actions on the same local date.
pub fn try_record_action(
    session_id: &SessionId,
    ip: &str,
    action: DemoAction,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<u32, Error> {
    let day = now.date();
    let count = count_actions_on(session_id, day, connection)?;

    if count >= MAX_DAILY_DEMO_ACTIONS {
        return Err(Error::QuotaExceeded);
    }

    let timestamp = now
        .format(&Rfc3339)
        .map_err(|error| Error::InvalidInput(error.to_string()))?;

    connection.execute(
        "INSERT INTO acciones_demo (ip, accion, session_id, fecha, dia) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![ip, action.as_str(), session_id.as_str(), timestamp, day],
    )?;

    Ok(MAX_DAILY_DEMO_ACTIONS.saturating_sub(count + 1))
}
