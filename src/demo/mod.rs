//! Demo mode lets anonymous visitors try the app on shared data.
//!
//! Each session may make a limited number of changes per day, and the data
//! visitors create is wiped every night or on request.

mod core;
mod rate_limit;
mod reset;

pub use core::{
    DemoAction, DemoState, MAX_DAILY_DEMO_ACTIONS, count_actions_on, create_demo_action_table,
    remaining_actions, try_record_action,
};
pub use rate_limit::{REMAINING_ACTIONS_HEADER, demo_quota_middleware, get_remaining_actions_endpoint};
pub use reset::{
    PROTECTED_BANK_IDS, PROTECTED_CLIENT_IDS, PROTECTED_TRANSACTION_IDS,
    duration_until_next_midnight, purge_session_data, reset_demo_endpoint,
    reset_to_protected_ids, run_daily_reset,
};
