//! Output formatting for the resolved inventory.
//!
//! This module handles presenting a [`ResolvedInventory`](crate::models::ResolvedInventory):
//! - [`json`] - Pretty-printed JSON
//! - [`table`] - Quoted CSV-like rows

mod json;
mod table;

pub use json::inventory_json;
pub use table::{format_field, inventory_table, load_balancer_rows, virtual_machine_rows};
