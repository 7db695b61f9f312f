//! Wipes the data created by demo visitors.
//!
//! There are two ways to reset. The nightly reset removes every row owned by a
//! session. The reset endpoint instead keeps a fixed set of rows by id and
//! removes everything else, including every check.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{Json, extract::State};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde_json::{Value, json};
use time::{OffsetDateTime, PrimitiveDateTime, Time};

use crate::{
    Error,
    bank::BankId,
    client::ClientId,
    db::lock_connection,
    demo::DemoState,
    timezone::local_now,
    transaction::TransactionId,
};

/// The banks kept by [reset_to_protected_ids].
pub const PROTECTED_BANK_IDS: [BankId; 2] = [1, 2];
/// The clients kept by [reset_to_protected_ids].
pub const PROTECTED_CLIENT_IDS: [ClientId; 3] = [1, 2, 3];
/// The transactions kept by [reset_to_protected_ids].
pub const PROTECTED_TRANSACTION_IDS: [TransactionId; 5] = [1, 2, 3, 4, 5];

/// Delete every row owned by a session and clear the demo action log.
pub fn purge_session_data(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    transaction.execute("DELETE FROM transacciones WHERE session_id IS NOT NULL", ())?;
    transaction.execute("DELETE FROM cheques WHERE session_id IS NOT NULL", ())?;
    transaction.execute("DELETE FROM clientes WHERE session_id IS NOT NULL", ())?;
    transaction.execute("DELETE FROM bancos WHERE session_id IS NOT NULL", ())?;
    transaction.execute("DELETE FROM acciones_demo", ())?;

    transaction.commit()?;

    Ok(())
}

fn id_list(ids: &[i64]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Delete every row except the protected banks, clients and transactions,
/// delete every check and clear the demo action log.
///
/// Protected transactions of a deleted bank are deleted along with it.
pub fn reset_to_protected_ids(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    transaction.execute(
        &format!(
            "DELETE FROM transacciones WHERE transaccion_id NOT IN ({})",
            id_list(&PROTECTED_TRANSACTION_IDS)
        ),
        (),
    )?;
    transaction.execute("DELETE FROM cheques", ())?;
    transaction.execute(
        &format!(
            "DELETE FROM clientes WHERE cliente_id NOT IN ({})",
            id_list(&PROTECTED_CLIENT_IDS)
        ),
        (),
    )?;
    transaction.execute(
        &format!(
            "DELETE FROM bancos WHERE banco_id NOT IN ({})",
            id_list(&PROTECTED_BANK_IDS)
        ),
        (),
    )?;
    transaction.execute("DELETE FROM acciones_demo", ())?;

    transaction.commit()?;

    Ok(())
}

/// A route handler that resets the demo data to the protected rows.
pub async fn reset_demo_endpoint(State(state): State<DemoState>) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    reset_to_protected_ids(&connection)?;
    tracing::info!("Reset demo data to protected rows");

    Ok(Json(json!({ "message": "Demo reseteado correctamente." })))
}

/// How long from `now` until the next midnight in the same UTC offset.
pub fn duration_until_next_midnight(now: OffsetDateTime) -> Duration {
    let Some(tomorrow) = now.date().next_day() else {
        return Duration::from_secs(24 * 60 * 60);
    };
    let midnight = PrimitiveDateTime::new(tomorrow, Time::MIDNIGHT).assume_offset(now.offset());

    Duration::try_from(midnight - now).unwrap_or(Duration::ZERO)
}

/// Purge session data every day at midnight in `local_timezone`.
///
/// Runs until the task is dropped, or returns early if the timezone is invalid.
pub async fn run_daily_reset(db_connection: Arc<Mutex<Connection>>, local_timezone: String) {
    loop {
        let now = match local_now(&local_timezone) {
            Ok(now) => now,
            Err(error) => {
                tracing::error!("Stopping the daily demo reset: {error}");
                return;
            }
        };

        let wait = duration_until_next_midnight(now);
        tracing::debug!("Next demo reset in {}s", wait.as_secs());
        tokio::time::sleep(wait).await;

        let result = lock_connection(&db_connection)
            .and_then(|connection| purge_session_data(&connection));

        match result {
            Ok(()) => tracing::info!("Daily demo reset succeeded"),
            Err(error) => tracing::error!("Daily demo reset failed: {error}"),
        }

        // Midnight may be seconds away again if the clock is slightly behind.
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
