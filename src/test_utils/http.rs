use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};
use rusqlite::Connection;

use crate::{AppOptions, AppState, build_router, session::SESSION_ID_HEADER};

pub(crate) const SESSION_A: &str = "sesion-a";
pub(crate) const SESSION_B: &str = "sesion-b";

/// Create app state backed by an in-memory database.
///
/// Passwords are hashed with the lowest bcrypt cost to keep the tests fast.
#[track_caller]
pub(crate) fn must_get_test_state(options: AppOptions) -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");

    AppState::new(
        connection,
        "test-secret",
        AppOptions {
            password_hash_cost: 4,
            ..options
        },
    )
    .expect("Could not create app state.")
}

#[track_caller]
pub(crate) fn get_test_server(state: AppState) -> TestServer {
    TestServer::new(build_router(state)).expect("Could not create test server.")
}

/// Send `request` as the session `session_id`.
pub(crate) fn with_session(request: TestRequest, session_id: &'static str) -> TestRequest {
    request.add_header(
        HeaderName::from_static(SESSION_ID_HEADER),
        HeaderValue::from_static(session_id),
    )
}
