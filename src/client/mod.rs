//! Clients are the counterparties named on transactions.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{
    Client, ClientForm, ClientId, ClientState, create_client_table, find_client_by_name,
    get_client, get_visible_client, insert_client, map_row_to_client,
};
pub use create_endpoint::{create_client, create_client_endpoint};
pub use delete_endpoint::{delete_client, delete_client_endpoint};
pub use edit_endpoint::{edit_client, edit_client_endpoint};
pub use list_endpoint::{list_clients, list_clients_endpoint};
