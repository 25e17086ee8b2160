//! Resolve the virtual machines and load balancers of an Azure resource group
//! into one view, including where each VM accepts WinRM over HTTPS.

pub mod azure;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;
pub mod resolver;

pub use config::{OutputFormat, Settings, WINRM_HTTPS_PORT};
pub use error::{InventoryError, ResourceType};
pub use models::{ResolvedInventory, ResolvedLoadBalancer, ResolvedVirtualMachine, WinRmEndpoint};
pub use resolver::ResourceGroupInventoryResolver;

use azure::{AzCliSource, SnapshotFileSource};

/// Resolve the resource group named in `settings`.
///
/// Replays `settings.snapshot_file` when set, otherwise lists the group through `az`.
pub async fn get_resource_group_details(
    settings: &Settings,
) -> Result<ResolvedInventory, InventoryError> {
    match &settings.snapshot_file {
        Some(path) => {
            ResourceGroupInventoryResolver::new(SnapshotFileSource::open(path)?)
                .get_resource_group_details(&settings.resource_group)
                .await
        }
        None => {
            ResourceGroupInventoryResolver::new(AzCliSource::new(settings.subscription_id.clone()))
                .get_resource_group_details(&settings.resource_group)
                .await
        }
    }
}
