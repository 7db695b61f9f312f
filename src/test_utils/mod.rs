#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod http;

pub(crate) use db::{
    insert_base_bank, insert_base_check, insert_base_client, insert_base_transaction,
    must_create_test_connection,
};
pub(crate) use http::{
    SESSION_A, SESSION_B, get_test_server, must_get_test_state, with_session,
};
