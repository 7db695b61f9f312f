mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{
    Bank, BankForm, BankId, BankState, create_bank_table, get_bank, get_visible_bank,
    map_row_to_bank,
};
pub use create_endpoint::{create_bank, create_bank_endpoint};
pub use delete_endpoint::{delete_bank, delete_bank_endpoint};
pub use edit_endpoint::{edit_bank, edit_bank_endpoint};
pub use list_endpoint::{list_banks, list_banks_endpoint};
