//! Bankbook is a bookkeeping API for banks, clients, checks and the
//! transactions between them.
//!
//! This library provides a JSON REST API. Every caller works inside an
//! anonymous session: records created by a session are private to it, while
//! base records with no session are shared and read-only. In demo mode each
//! session may make a limited number of changes per day and the data set is
//! reset every night.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod bank;
mod check;
mod client;
mod database_id;
mod db;
mod demo;
mod endpoints;
mod error;
mod json;
mod logging;
mod name;
mod routing;
mod session;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppOptions, AppState};
pub use auth::{PasswordHash, ValidatedPassword};
pub use db::initialize as initialize_db;
pub use demo::run_daily_reset;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::{build_cors_layer, build_router};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
