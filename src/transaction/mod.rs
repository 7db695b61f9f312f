//! Transactions record money moving in or out of a bank.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` row model and the `TransactionView` sent to clients
//! - The steps that resolve the client and check named by a request
//! - The route handlers for listing, creating, editing and deleting transactions

mod core;
mod create_endpoint;
mod date;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod resolve;

pub use core::{
    Transaction, TransactionId, TransactionKind, TransactionResponse, TransactionState,
    TransactionView, create_transaction_table, get_transaction, get_transaction_view,
    map_row_to_transaction, map_row_to_transaction_view,
};
pub use create_endpoint::{CreateTransactionForm, create_transaction, create_transaction_endpoint};
pub use date::{format_stored_date, parse_date_input};
pub use delete_endpoint::{DeleteOutcome, delete_transaction, delete_transaction_endpoint};
pub use edit_endpoint::{EditTransactionForm, edit_transaction, edit_transaction_endpoint};
pub use list_endpoint::{list_transactions, list_transactions_endpoint};
pub use resolve::{resolve_check_for_create, resolve_check_for_edit, resolve_client, split_name};
