//! Optional user accounts with bearer token authentication.
//!
//! Users register and log in to get a JSON Web Token. When the server requires
//! authentication, the bookkeeping routes reject requests without a valid,
//! unrevoked token. Ownership of records is still decided by the session.

mod log_in;
mod log_out;
mod middleware;
mod password;
mod register;
mod token;
mod user;

pub use log_in::{Credentials, log_in, log_in_endpoint};
pub use log_out::log_out_endpoint;
pub use middleware::{AuthState, BearerToken, auth_guard, validate_token_endpoint};
pub use password::{PasswordHash, ValidatedPassword};
pub use register::{register_user, register_user_endpoint};
pub use token::{
    AuthKeys, Claims, DEFAULT_TOKEN_DURATION, create_revoked_token_table, is_token_revoked,
    revoke_token,
};
pub use user::{User, UserId, create_user, create_user_table, get_user_by_username};
