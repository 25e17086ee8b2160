//! Collectors for the four inventory collections of a resource group.

use super::arm;
use crate::error::{FetchError, InventoryError, ResourceType};
use crate::models::{
    InventorySnapshot, LoadBalancer, NetworkInterface, PublicIpAddress, VirtualMachine,
};
use std::path::{Path, PathBuf};

/// Something that can list the raw resources of a resource group.
///
/// Each call returns the complete collection or fails; the caller tags
/// failures with the resource type.
#[allow(async_fn_in_trait)]
pub trait InventorySource {
    async fn load_balancers(&self, resource_group: &str) -> Result<Vec<LoadBalancer>, FetchError>;

    async fn network_interfaces(
        &self,
        resource_group: &str,
    ) -> Result<Vec<NetworkInterface>, FetchError>;

    async fn public_ip_addresses(
        &self,
        resource_group: &str,
    ) -> Result<Vec<PublicIpAddress>, FetchError>;

    async fn virtual_machines(
        &self,
        resource_group: &str,
    ) -> Result<Vec<VirtualMachine>, FetchError>;
}

/// Live collector backed by `az rest`.
#[derive(Debug, Clone, Default)]
pub struct AzCliSource {
    subscription_id: Option<String>,
}

impl AzCliSource {
    /// Without a subscription id the logged-in account's subscription is used.
    pub fn new(subscription_id: Option<String>) -> Self {
        AzCliSource { subscription_id }
    }

    async fn list<T: serde::de::DeserializeOwned>(
        &self,
        resource_group: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<T>, FetchError> {
        let url = arm::list_url(self.subscription_id.as_deref(), resource_group, resource_type);
        let records: Vec<T> = arm::list_all(url).await?;
        log::info!(
            "{resource_type}: {count} records in resource group {resource_group}",
            count = records.len()
        );
        Ok(records)
    }
}

impl InventorySource for AzCliSource {
    async fn load_balancers(&self, resource_group: &str) -> Result<Vec<LoadBalancer>, FetchError> {
        self.list(resource_group, ResourceType::LoadBalancers).await
    }

    async fn network_interfaces(
        &self,
        resource_group: &str,
    ) -> Result<Vec<NetworkInterface>, FetchError> {
        self.list(resource_group, ResourceType::NetworkInterfaces)
            .await
    }

    async fn public_ip_addresses(
        &self,
        resource_group: &str,
    ) -> Result<Vec<PublicIpAddress>, FetchError> {
        self.list(resource_group, ResourceType::PublicIpAddresses)
            .await
    }

    async fn virtual_machines(
        &self,
        resource_group: &str,
    ) -> Result<Vec<VirtualMachine>, FetchError> {
        self.list(resource_group, ResourceType::VirtualMachines).await
    }
}

/// A snapshot already in memory serves its own collections, whatever the group.
impl InventorySource for InventorySnapshot {
    async fn load_balancers(&self, _resource_group: &str) -> Result<Vec<LoadBalancer>, FetchError> {
        Ok(self.load_balancers.clone())
    }

    async fn network_interfaces(
        &self,
        _resource_group: &str,
    ) -> Result<Vec<NetworkInterface>, FetchError> {
        Ok(self.network_interfaces.clone())
    }

    async fn public_ip_addresses(
        &self,
        _resource_group: &str,
    ) -> Result<Vec<PublicIpAddress>, FetchError> {
        Ok(self.public_ip_addresses.clone())
    }

    async fn virtual_machines(
        &self,
        _resource_group: &str,
    ) -> Result<Vec<VirtualMachine>, FetchError> {
        Ok(self.virtual_machines.clone())
    }
}

/// Replays a snapshot saved as JSON.
///
/// The file is parsed once when opened, so every collector call sees the same snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotFileSource {
    path: PathBuf,
    snapshot: InventorySnapshot,
}

impl SnapshotFileSource {
    /// Open a snapshot file, checking it exists and parses.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InventoryError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(InventoryError::SnapshotFile {
                path,
                source: "file does not exist".into(),
            });
        }
        let snapshot = match read_snapshot(&path) {
            Ok(snapshot) => snapshot,
            Err(source) => return Err(InventoryError::SnapshotFile { path, source }),
        };
        log::info!("Using snapshot file: {}", path.display());
        Ok(SnapshotFileSource { path, snapshot })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_snapshot(path: &Path) -> Result<InventorySnapshot, FetchError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    let mut deserializer = serde_json::Deserializer::from_str(&json);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        format!(
            "Error parsing {}: path={} error={}",
            path.display(),
            e.path(),
            e
        )
        .into()
    })
}

impl InventorySource for SnapshotFileSource {
    async fn load_balancers(&self, resource_group: &str) -> Result<Vec<LoadBalancer>, FetchError> {
        self.snapshot.load_balancers(resource_group).await
    }

    async fn network_interfaces(
        &self,
        resource_group: &str,
    ) -> Result<Vec<NetworkInterface>, FetchError> {
        self.snapshot.network_interfaces(resource_group).await
    }

    async fn public_ip_addresses(
        &self,
        resource_group: &str,
    ) -> Result<Vec<PublicIpAddress>, FetchError> {
        self.snapshot.public_ip_addresses(resource_group).await
    }

    async fn virtual_machines(
        &self,
        resource_group: &str,
    ) -> Result<Vec<VirtualMachine>, FetchError> {
        self.snapshot.virtual_machines(resource_group).await
    }
}
