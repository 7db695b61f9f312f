//! Checks are the paper checks used to pay for `pago_cheque` transactions.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{
    Check, CheckForm, CheckId, CheckNumber, CheckState, check_number_taken, create_check_table,
    find_check_by_number, get_check, insert_check, map_row_to_check, update_check_number,
};
pub use create_endpoint::{create_check, create_check_endpoint};
pub use delete_endpoint::{delete_check, delete_check_endpoint};
pub use edit_endpoint::{edit_check, edit_check_endpoint};
pub use list_endpoint::{list_checks, list_checks_endpoint};
