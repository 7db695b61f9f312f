//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Duration;

use crate::{
    Error,
    auth::{AuthKeys, DEFAULT_TOKEN_DURATION, PasswordHash},
    db::initialize,
    timezone::get_local_offset,
};

/// Settings that change how the server behaves.
#[derive(Debug, Clone, PartialEq)]
pub struct AppOptions {
    /// The local timezone as a canonical timezone name, e.g. "America/Montevideo".
    ///
    /// Demo quotas reset at midnight in this timezone.
    pub local_timezone: String,
    /// Whether to count and limit the actions of each session.
    pub demo_mode: bool,
    /// Whether the bookkeeping routes require a bearer token.
    pub require_auth: bool,
    /// How long issued tokens are valid for.
    pub token_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            local_timezone: "Etc/UTC".to_owned(),
            demo_mode: false,
            require_auth: false,
            token_duration: DEFAULT_TOKEN_DURATION,
            password_hash_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The local timezone as a canonical timezone name, e.g. "America/Montevideo".
    pub local_timezone: String,

    /// Whether demo quotas are enforced.
    pub demo_mode: bool,

    /// Whether the bookkeeping routes require a bearer token.
    pub require_auth: bool,

    /// The keys used to sign and verify bearer tokens.
    pub auth_keys: AuthKeys,

    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or if
    /// `options.local_timezone` is not a valid, canonical timezone name.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        options: AppOptions,
    ) -> Result<Self, Error> {
        if get_local_offset(&options.local_timezone).is_none() {
            return Err(Error::InvalidTimezone(options.local_timezone));
        }

        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            local_timezone: options.local_timezone,
            demo_mode: options.demo_mode,
            require_auth: options.require_auth,
            auth_keys: AuthKeys::new(jwt_secret, options.token_duration),
            password_hash_cost: options.password_hash_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::Error;

    use super::{AppOptions, AppState};

    #[test]
    fn rejects_unknown_timezone() {
        let connection = Connection::open_in_memory().unwrap();
        let options = AppOptions {
            local_timezone: "Nowhere/Special".to_owned(),
            ..Default::default()
        };

        let result = AppState::new(connection, "secret", options);

        assert!(matches!(result, Err(Error::InvalidTimezone(_))));
    }
}
