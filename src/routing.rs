//! Application router configuration with the bookkeeping, demo and auth routes.

use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    AppState,
    auth::{
        auth_guard, log_in_endpoint, log_out_endpoint, register_user_endpoint,
        validate_token_endpoint,
    },
    bank::{create_bank_endpoint, delete_bank_endpoint, edit_bank_endpoint, list_banks_endpoint},
    check::{
        create_check_endpoint, delete_check_endpoint, edit_check_endpoint, list_checks_endpoint,
    },
    client::{
        create_client_endpoint, delete_client_endpoint, edit_client_endpoint,
        list_clients_endpoint,
    },
    demo::{
        REMAINING_ACTIONS_HEADER, demo_quota_middleware, get_remaining_actions_endpoint,
        reset_demo_endpoint,
    },
    endpoints,
    session::{SESSION_ID_HEADER, session_middleware},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// The bank, client, check and transaction routes count towards the demo
/// quota. When `state.require_auth` is set, they and the demo routes also
/// need a valid bearer token.
pub fn build_router(state: AppState) -> Router {
    let resource_routes = Router::new()
        .route(
            endpoints::BANKS,
            get(list_banks_endpoint).post(create_bank_endpoint),
        )
        .route(
            endpoints::BANK,
            put(edit_bank_endpoint).delete(delete_bank_endpoint),
        )
        .route(
            endpoints::CLIENTS,
            get(list_clients_endpoint).post(create_client_endpoint),
        )
        .route(
            endpoints::CLIENT,
            put(edit_client_endpoint).delete(delete_client_endpoint),
        )
        .route(
            endpoints::CHECKS,
            get(list_checks_endpoint).post(create_check_endpoint),
        )
        .route(
            endpoints::CHECK,
            put(edit_check_endpoint).delete(delete_check_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            demo_quota_middleware,
        ));

    let demo_routes = Router::new()
        .route(endpoints::RESET_DEMO, post(reset_demo_endpoint))
        .route(
            endpoints::REMAINING_ACTIONS,
            get(get_remaining_actions_endpoint),
        );

    let mut bookkeeping_routes = resource_routes.merge(demo_routes);
    if state.require_auth {
        bookkeeping_routes =
            bookkeeping_routes.layer(middleware::from_fn_with_state(state.clone(), auth_guard));
    }

    let protected_auth_routes = Router::new()
        .route(endpoints::VALIDATE_TOKEN, get(validate_token_endpoint))
        .route(endpoints::LOG_OUT, post(log_out_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let unprotected_routes = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::REGISTER, post(register_user_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint));

    bookkeeping_routes
        .merge(protected_auth_routes)
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(session_middleware))
        .with_state(state)
}

/// Build the CORS policy for browser clients.
///
/// An empty `allowed_origins` allows any origin. Origins that are not valid
/// header values are skipped.
pub fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(SESSION_ID_HEADER),
        ])
        .expose_headers([
            HeaderName::from_static(SESSION_ID_HEADER),
            HeaderName::from_static(REMAINING_ACTIONS_HEADER),
        ]);

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!("Skipping invalid CORS origin {origin:?}: {error}");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

async fn get_health() -> &'static str {
    "¡Test exitoso!"
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Ruta no encontrada" })),
    )
        .into_response()
}
