//! Azure CLI and Resource Manager interaction.
//!
//! This module handles all Azure-related operations:
//! - [`cli`] - Command execution for Azure CLI
//! - [`arm`] - Resource Manager list calls with paging
//! - [`source`] - Collectors for the four resource group collections

mod arm;
mod cli;
mod source;

// Re-export public types and functions
pub use arm::{list_all, list_all_with, list_url, parse_page};
pub use cli::run;
pub use source::{AzCliSource, InventorySource, SnapshotFileSource};
