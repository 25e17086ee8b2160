//! Fetch-then-correlate entry point for one resource group.

use crate::azure::InventorySource;
use crate::error::{FetchError, InventoryError, ResourceType};
use crate::models::{InventorySnapshot, ResolvedInventory};
use crate::processing::correlate;
use futures::TryFutureExt;

/// Resolves the inventory of a resource group from an [`InventorySource`].
///
/// Holds no state between calls, every call fetches and correlates afresh.
#[derive(Debug, Clone)]
pub struct ResourceGroupInventoryResolver<S> {
    source: S,
}

fn tagged(resource_type: ResourceType) -> impl FnOnce(FetchError) -> InventoryError {
    move |source| InventoryError::CollectionFetch {
        resource_type,
        source,
    }
}

impl<S: InventorySource> ResourceGroupInventoryResolver<S> {
    pub fn new(source: S) -> Self {
        ResourceGroupInventoryResolver { source }
    }

    /// The collectors this resolver fetches from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch all four collections concurrently.
    ///
    /// The first failing collector fails the whole fetch, results of the
    /// others are dropped.
    pub async fn fetch_snapshot(
        &self,
        resource_group: &str,
    ) -> Result<InventorySnapshot, InventoryError> {
        let resource_group = resource_group.trim();
        if resource_group.is_empty() {
            return Err(InventoryError::InvalidResourceGroup);
        }
        log::info!("#Start fetch_snapshot({resource_group})");

        let (load_balancers, network_interfaces, public_ip_addresses, virtual_machines) =
            futures::try_join!(
                self.source
                    .load_balancers(resource_group)
                    .map_err(tagged(ResourceType::LoadBalancers)),
                self.source
                    .network_interfaces(resource_group)
                    .map_err(tagged(ResourceType::NetworkInterfaces)),
                self.source
                    .public_ip_addresses(resource_group)
                    .map_err(tagged(ResourceType::PublicIpAddresses)),
                self.source
                    .virtual_machines(resource_group)
                    .map_err(tagged(ResourceType::VirtualMachines)),
            )
            .map_err(|e| {
                log::error!("{e}");
                e
            })?;

        log::info!(
            "# Got lb={} nic={} pip={} vm={}",
            load_balancers.len(),
            network_interfaces.len(),
            public_ip_addresses.len(),
            virtual_machines.len()
        );

        Ok(InventorySnapshot {
            load_balancers,
            network_interfaces,
            public_ip_addresses,
            virtual_machines,
        })
    }

    /// Fetch the resource group and resolve VMs and load balancers.
    pub async fn get_resource_group_details(
        &self,
        resource_group: &str,
    ) -> Result<ResolvedInventory, InventoryError> {
        let snapshot = self.fetch_snapshot(resource_group).await?;
        let inventory = correlate(&snapshot)?;
        log::info!("Resolved {resource_group}: {inventory}");
        Ok(inventory)
    }
}
