//! Domain models for resource group inventory.
//!
//! This module contains the core data structures used throughout the application:
//! - [`resource`] - Typed ARM records as returned by the list operations
//! - [`inventory`] - The snapshot and the resolved inventory

mod inventory;
mod resource;

// Re-export public types
pub use inventory::{
    InventorySnapshot, ResolvedInventory, ResolvedLoadBalancer, ResolvedVirtualMachine,
    WinRmEndpoint,
};
pub use resource::{
    ArmPage, BackendAddressPool, BackendAddressPoolProperties, DnsSettings,
    FrontendIpConfiguration, FrontendIpConfigurationProperties, InboundNatRule,
    InboundNatRuleProperties, IpConfiguration, IpConfigurationProperties, LoadBalancer,
    LoadBalancerProperties, NetworkInterface, NetworkInterfaceProperties, NetworkProfile,
    PublicIpAddress, PublicIpAddressProperties, SubResource, VirtualMachine,
    VirtualMachineProperties,
};
