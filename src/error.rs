//! Defines the app level error type and its conversion into JSON error responses.
use std::fmt::Display;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The kinds of records that callers can read and modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// A bank account, see [crate::bank::Bank].
    Bank,
    /// A client, see [crate::client::Client].
    Client,
    /// A check, see [crate::check::Check].
    Check,
    /// A transaction, see [crate::transaction::Transaction].
    Transaction,
}

impl Resource {
    fn not_found_message(self) -> &'static str {
        match self {
            Resource::Bank => "Banco no encontrado",
            Resource::Client => "Cliente no encontrado",
            Resource::Check => "Cheque no encontrado",
            Resource::Transaction => "Transacción no encontrada",
        }
    }

    fn base_record_message(self) -> &'static str {
        match self {
            Resource::Bank => "No se pueden modificar bancos base del sistema",
            Resource::Client => "No se pueden modificar clientes base del sistema",
            Resource::Check => "No se pueden modificar cheques base del sistema",
            Resource::Transaction => "No se puede modificar una transacción base",
        }
    }

    fn foreign_session_message(self) -> &'static str {
        match self {
            Resource::Bank => "No autorizado para modificar este banco",
            Resource::Client => "No autorizado para modificar este cliente",
            Resource::Check => "No autorizado para modificar este cheque",
            Resource::Transaction => "No autorizado para modificar esta transacción",
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::Bank => "bank",
            Resource::Client => "client",
            Resource::Check => "check",
            Resource::Transaction => "transaction",
        };

        f.write_str(name)
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required field was missing or a field had an invalid value.
    ///
    /// The message is shown to the client as-is, so it should name the field.
    #[error("{0}")]
    InvalidInput(String),

    /// A bank with the same name is already visible to the caller.
    #[error("the bank \"{0}\" already exists")]
    DuplicateBankName(String),

    /// A client with the same first and last name is already visible to the caller.
    #[error("the client \"{0}\" already exists")]
    DuplicateClientName(String),

    /// A check with the same number is already visible to the caller.
    #[error("the check number \"{0}\" already exists")]
    DuplicateCheckNumber(String),

    /// The bank referenced by a transaction does not exist or is not visible to the caller.
    #[error("the bank {0} does not exist")]
    InvalidBank(i64),

    /// The client referenced by a transaction does not exist or is not visible to the caller.
    #[error("the client {0} does not exist")]
    InvalidClient(i64),

    /// The check referenced by a transaction does not exist or is not visible to the caller.
    #[error("the check {0} does not exist")]
    InvalidCheck(i64),

    /// The requested record does not exist.
    #[error("the {0} could not be found")]
    NotFound(Resource),

    /// A query returned no rows where exactly one was expected.
    ///
    /// Callers that know which record they were looking for should map this
    /// to [Error::NotFound].
    #[error("the requested row could not be found")]
    RowNotFound,

    /// The caller tried to modify a record that belongs to no session.
    #[error("the {0} is base data and cannot be modified")]
    BaseRecord(Resource),

    /// The caller tried to modify a record owned by another session.
    #[error("the {0} belongs to another session")]
    ForeignSession(Resource),

    /// The caller used up the daily allowance of actions in demo mode.
    #[error("the daily demo action limit has been reached")]
    QuotaExceeded,

    /// The request did not carry a session id.
    ///
    /// This happens only if a handler is mounted without the session middleware.
    #[error("the request has no session id")]
    MissingSession,

    /// The request did not include a bearer token.
    #[error("missing bearer token")]
    MissingToken,

    /// The bearer token could not be verified or has expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The bearer token was revoked by logging out.
    #[error("the token has been revoked")]
    RevokedToken,

    /// The token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The username or password did not match a registered user.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The username is already registered.
    #[error("the username \"{0}\" is already registered")]
    DuplicateUsername(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The configured timezone is not a valid canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::RowNotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidInput(rejection.body_text())
    }
}

impl Error {
    /// Map [Error::RowNotFound] to a not found error for `resource`.
    pub fn or_not_found(self, resource: Resource) -> Self {
        match self {
            Error::RowNotFound => Error::NotFound(resource),
            error => error,
        }
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Error::InvalidInput(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Error::DuplicateBankName(_) => (
                StatusCode::BAD_REQUEST,
                "Ya existe un banco con ese nombre".to_owned(),
            ),
            Error::DuplicateClientName(_) => (
                StatusCode::BAD_REQUEST,
                "Ya existe un cliente con ese nombre".to_owned(),
            ),
            Error::DuplicateCheckNumber(_) => (
                StatusCode::BAD_REQUEST,
                "Ya existe un cheque con ese número".to_owned(),
            ),
            Error::InvalidBank(id) => (
                StatusCode::BAD_REQUEST,
                format!("El banco {id} no existe"),
            ),
            Error::InvalidClient(id) => (
                StatusCode::BAD_REQUEST,
                format!("El cliente {id} no existe"),
            ),
            Error::InvalidCheck(id) => (
                StatusCode::BAD_REQUEST,
                format!("El cheque {id} no existe"),
            ),
            Error::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                resource.not_found_message().to_owned(),
            ),
            Error::RowNotFound => (
                StatusCode::NOT_FOUND,
                "Recurso no encontrado".to_owned(),
            ),
            Error::BaseRecord(resource) => (
                StatusCode::FORBIDDEN,
                resource.base_record_message().to_owned(),
            ),
            Error::ForeignSession(resource) => (
                StatusCode::FORBIDDEN,
                resource.foreign_session_message().to_owned(),
            ),
            Error::QuotaExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "Límite diario alcanzado para esta acción en modo DEMO.".to_owned(),
            ),
            Error::MissingToken => (StatusCode::UNAUTHORIZED, "Token requerido".to_owned()),
            Error::InvalidToken => (
                StatusCode::FORBIDDEN,
                "Token inválido o expirado".to_owned(),
            ),
            Error::RevokedToken => (StatusCode::FORBIDDEN, "Token revocado".to_owned()),
            Error::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "Usuario o contraseña incorrectos".to_owned(),
            ),
            Error::DuplicateUsername(_) => (
                StatusCode::BAD_REQUEST,
                "El nombre de usuario ya está registrado".to_owned(),
            ),
            Error::TooWeak(feedback) => (
                StatusCode::BAD_REQUEST,
                format!("La contraseña es demasiado débil: {feedback}"),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error interno del servidor".to_owned(),
                )
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        (status, Json(json!({ "error": message }))).into_response()
    }
}
