//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/bancos/{banco_id}', use [format_endpoint].

/// The route to list and create banks.
pub const BANKS: &str = "/bancos";
/// The route to update or delete a single bank.
pub const BANK: &str = "/bancos/{banco_id}";
/// The route to list and create clients.
pub const CLIENTS: &str = "/clientes";
/// The route to update or delete a single client.
pub const CLIENT: &str = "/clientes/{cliente_id}";
/// The route to list and create checks.
pub const CHECKS: &str = "/cheques";
/// The route to update or delete a single check.
pub const CHECK: &str = "/cheques/{cheque_id}";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/transacciones";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/transacciones/{transaccion_id}";

/// The route to restore the demo data set.
pub const RESET_DEMO: &str = "/demo/reset-demo";
/// The route to get how many demo actions the caller has left today.
pub const REMAINING_ACTIONS: &str = "/demo/acciones-restantes";

/// The route for registering a user.
pub const REGISTER: &str = "/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/auth/login";
/// The route for checking a bearer token.
pub const VALIDATE_TOKEN: &str = "/auth/validate-token";
/// The route for revoking the caller's bearer token.
pub const LOG_OUT: &str = "/auth/logout";

/// A liveness check.
pub const HEALTH: &str = "/test";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/bancos/{banco_id}', '{banco_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
