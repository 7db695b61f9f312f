//! Issuing, verifying and revoking JSON Web Tokens.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{User, UserId},
    transaction::format_stored_date,
};

/// How long a token is valid for unless configured otherwise.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::hours(1);

/// The contents of a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The id of the user the token was issued to.
    pub id: UserId,
    pub username: String,
    /// When the token was issued, in seconds since the Unix epoch.
    pub iat: i64,
    /// When the token expires, in seconds since the Unix epoch.
    pub exp: i64,
}

/// The keys for signing and verifying tokens with a shared secret.
#[derive(Clone)]
pub struct AuthKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// How long issued tokens are valid for.
    pub token_duration: Duration,
}

impl AuthKeys {
    /// Create keys from the shared `secret` for tokens that last `token_duration`.
    pub fn new(secret: &str, token_duration: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_duration,
        }
    }

    /// Sign a token for `user` issued at `now`.
    ///
    /// # Errors
    /// Returns [Error::TokenCreation] if the token could not be encoded.
    pub fn create_token(&self, user: &User, now: OffsetDateTime) -> Result<String, Error> {
        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            iat: now.unix_timestamp(),
            exp: (now + self.token_duration).unix_timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|error| Error::TokenCreation(error.to_string()))
    }

    /// Verify the signature and expiry of `token`.
    ///
    /// # Errors
    /// Returns [Error::InvalidToken] if the token is malformed, signed with
    /// another secret or expired.
    pub fn verify_token(&self, token: &str) -> Result<Claims, Error> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|error| {
                tracing::debug!("Rejected token: {error}");
                Error::InvalidToken
            })
    }
}

pub fn create_revoked_token_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS revoked_tokens (
            token TEXT PRIMARY KEY,
            revoked_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Whether `token` was revoked by logging out.
pub fn is_token_revoked(token: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE token = ?1)",
            params![token],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Revoke `token` so that it is rejected even before it expires.
///
/// Revoking a token twice has no further effect. Tokens revoked more than
/// `token_duration` before `now` have expired by themselves and are forgotten.
pub fn revoke_token(
    token: &str,
    now: OffsetDateTime,
    token_duration: Duration,
    connection: &Connection,
) -> Result<(), Error> {
    let revoked_at = format_stored_date(now)?;
    let cutoff = format_stored_date(now - token_duration)?;

    connection.execute(
        "DELETE FROM revoked_tokens WHERE revoked_at < ?1",
        params![cutoff],
    )?;
    connection.execute(
        "INSERT OR IGNORE INTO revoked_tokens (token, revoked_at) VALUES (?1, ?2)",
        params![token, revoked_at],
    )?;

    Ok(())
}
