//! Error types for resource group inventory resolution.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Error returned by a collector before it is tagged with its resource type.
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// The four ARM collections fetched for a resource group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    LoadBalancers,
    NetworkInterfaces,
    PublicIpAddresses,
    VirtualMachines,
}

impl ResourceType {
    /// ARM collection name, as used in list URLs.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceType::LoadBalancers => "loadBalancers",
            ResourceType::NetworkInterfaces => "networkInterfaces",
            ResourceType::PublicIpAddresses => "publicIPAddresses",
            ResourceType::VirtualMachines => "virtualMachines",
        }
    }

    /// ARM resource provider namespace owning the collection.
    pub fn provider(&self) -> &'static str {
        match self {
            ResourceType::VirtualMachines => "Microsoft.Compute",
            _ => "Microsoft.Network",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Everything that can make `get_resource_group_details` fail.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("failed to fetch {resource_type}: {source}")]
    CollectionFetch {
        resource_type: ResourceType,
        #[source]
        source: FetchError,
    },

    #[error("malformed {resource_type} record '{id}': {reason}")]
    MalformedResource {
        resource_type: ResourceType,
        id: String,
        reason: String,
    },

    #[error("resource group name must not be empty")]
    InvalidResourceGroup,

    #[error("cannot load snapshot file {path}: {source}")]
    SnapshotFile {
        path: PathBuf,
        #[source]
        source: FetchError,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl InventoryError {
    /// The resource type the error is about, if it concerns one.
    pub fn resource_type(&self) -> Option<ResourceType> {
        match self {
            InventoryError::CollectionFetch { resource_type, .. }
            | InventoryError::MalformedResource { resource_type, .. } => Some(*resource_type),
            _ => None,
        }
    }
}
