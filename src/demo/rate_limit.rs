//! Middleware that limits how many changes each session may make per day in demo mode.

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::{
    Error,
    db::lock_connection,
    demo::{DemoAction, DemoState, MAX_DAILY_DEMO_ACTIONS, remaining_actions, try_record_action},
    session::SessionId,
    timezone::local_now,
};

/// The response header with the number of changes the session has left today.
pub const REMAINING_ACTIONS_HEADER: &str = "x-acciones-restantes";

/// Middleware that counts POST, PUT and DELETE requests against the daily
/// demo quota of the caller's session.
///
/// Requests over the quota are rejected with 429 before they reach the route
/// handler. Accepted requests are counted even if the handler then fails.
/// Does nothing unless demo mode is on.
pub async fn demo_quota_middleware(
    State(state): State<DemoState>,
    session_id: SessionId,
    request: Request,
    next: Next,
) -> Response {
    if !state.demo_mode {
        return next.run(request).await;
    }

    let Some(action) = DemoAction::from_method(request.method()) else {
        return next.run(request).await;
    };

    let ip = client_ip(&request);
    let remaining = match record_demo_action(&state, &session_id, &ip, action) {
        Ok(remaining) => remaining,
        Err(error) => {
            tracing::info!("Rejected {} by session {session_id}: {error}", action.as_str());
            return error.into_response();
        }
    };

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(REMAINING_ACTIONS_HEADER, HeaderValue::from(remaining));

    response
}

/// The database lock is held from counting to logging the action, and
/// released before the request is handled.
fn record_demo_action(
    state: &DemoState,
    session_id: &SessionId,
    ip: &str,
    action: DemoAction,
) -> Result<u32, Error> {
    let now = local_now(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    try_record_action(session_id, ip, action, now, &connection)
}

/// The address of the client, preferring the first `x-forwarded-for` entry
/// set by a proxy over the address of the peer.
fn client_ip(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_owned();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// A route handler that responds with how many changes the caller's session has left today.
pub async fn get_remaining_actions_endpoint(
    State(state): State<DemoState>,
    session_id: SessionId,
) -> Result<Json<Value>, Error> {
    if !state.demo_mode {
        return Ok(Json(json!({ "restantes": MAX_DAILY_DEMO_ACTIONS })));
    }

    let today = local_now(&state.local_timezone)?.date();
    let connection = lock_connection(&state.db_connection)?;
    let remaining = remaining_actions(&session_id, today, &connection)?;

    Ok(Json(json!({ "restantes": remaining })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        AppOptions,
        demo::MAX_DAILY_DEMO_ACTIONS,
        endpoints,
        test_utils::{SESSION_A, SESSION_B, get_test_server, must_get_test_state, with_session},
    };

    use super::REMAINING_ACTIONS_HEADER;

    fn demo_options() -> AppOptions {
        AppOptions {
            demo_mode: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn thirty_first_change_is_rejected() {
        let server = get_test_server(must_get_test_state(demo_options()));
        let mut remaining = Vec::new();

        for i in 0..MAX_DAILY_DEMO_ACTIONS {
            let response = with_session(server.post(endpoints::CHECKS), SESSION_A)
                .json(&json!({ "numero": i }))
                .await;
            response.assert_status(StatusCode::CREATED);
            let header = response.header(REMAINING_ACTIONS_HEADER);
            remaining.push(header.to_str().unwrap().parse::<u32>().unwrap());
        }

        assert_eq!(remaining.first(), Some(&29));
        assert_eq!(remaining.last(), Some(&0));
        assert!(remaining.windows(2).all(|pair| pair[0] > pair[1]));

        let response = with_session(server.post(endpoints::CHECKS), SESSION_A)
            .json(&json!({ "numero": "extra" }))
            .await;
        response.assert_status(StatusCode::TOO_MANY_REQUESTS);
        response.assert_json(&json!({
            "error": "Límite diario alcanzado para esta acción en modo DEMO."
        }));

        with_session(server.post(endpoints::CHECKS), SESSION_B)
            .json(&json!({ "numero": "otra sesión" }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn reads_are_not_counted() {
        let server = get_test_server(must_get_test_state(demo_options()));

        let response = with_session(server.get(endpoints::BANKS), SESSION_A).await;

        response.assert_status_ok();
        assert!(response.maybe_header(REMAINING_ACTIONS_HEADER).is_none());
        with_session(server.get(endpoints::REMAINING_ACTIONS), SESSION_A)
            .await
            .assert_json(&json!({ "restantes": MAX_DAILY_DEMO_ACTIONS }));
    }

    #[tokio::test]
    async fn remaining_count_follows_changes() {
        let server = get_test_server(must_get_test_state(demo_options()));

        with_session(server.post(endpoints::BANKS), SESSION_A)
            .json(&json!({ "nombre": "BROU", "saldo_total": 0 }))
            .await
            .assert_status(StatusCode::CREATED);

        with_session(server.get(endpoints::REMAINING_ACTIONS), SESSION_A)
            .await
            .assert_json(&json!({ "restantes": MAX_DAILY_DEMO_ACTIONS - 1 }));
    }

    #[tokio::test]
    async fn quota_is_off_outside_demo_mode() {
        let server = get_test_server(must_get_test_state(Default::default()));

        let response = with_session(server.post(endpoints::BANKS), SESSION_A)
            .json(&json!({ "nombre": "BROU", "saldo_total": 0 }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert!(response.maybe_header(REMAINING_ACTIONS_HEADER).is_none());
    }
}
