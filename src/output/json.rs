//! JSON output of the resolved inventory.

use crate::models::ResolvedInventory;

/// Render the inventory as pretty-printed JSON with camelCase keys.
pub fn inventory_json(inventory: &ResolvedInventory) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(inventory)
}
