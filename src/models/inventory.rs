//! Resolved inventory handed to callers.

use super::{LoadBalancer, NetworkInterface, PublicIpAddress, VirtualMachine};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The four raw collections of one resource group, fetched in one pass.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    #[serde(default)]
    pub load_balancers: Vec<LoadBalancer>,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
    #[serde(default, rename = "publicIPAddresses")]
    pub public_ip_addresses: Vec<PublicIpAddress>,
    #[serde(default)]
    pub virtual_machines: Vec<VirtualMachine>,
}

/// Where to reach a VM for WinRM over HTTPS.
///
/// The address is absent when the NAT rule found belongs to a load balancer
/// whose front end has no public address.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WinRmEndpoint {
    pub port: u16,
    pub address: Option<String>,
}

impl fmt::Display for WinRmEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            Some(address) => write!(f, "{}:{}", address, self.port),
            None => write!(f, "?:{}", self.port),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedVirtualMachine {
    pub name: String,
    /// Names of the VM's network interfaces, in network-profile order.
    pub network_interfaces: Vec<String>,
    pub tags: HashMap<String, String>,
    /// First WinRM HTTPS endpoint found, if any.
    pub winrm_https: Option<WinRmEndpoint>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLoadBalancer {
    pub name: String,
    /// DNS name or IP of the first front-end configuration.
    pub front_end_public_address: Option<String>,
    /// Front-end ports of all inbound NAT rules, in rule order.
    pub front_end_ports_in_use: Vec<u16>,
    /// Names of the network interfaces in the back-end pools.
    pub backend_nic_names: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedInventory {
    pub virtual_machines: Vec<ResolvedVirtualMachine>,
    pub load_balancers: Vec<ResolvedLoadBalancer>,
}

impl ResolvedInventory {
    /// Look up a resolved VM by name.
    pub fn virtual_machine(&self, name: &str) -> Option<&ResolvedVirtualMachine> {
        self.virtual_machines.iter().find(|vm| vm.name == name)
    }

    /// Look up a resolved load balancer by name.
    pub fn load_balancer(&self, name: &str) -> Option<&ResolvedLoadBalancer> {
        self.load_balancers.iter().find(|lb| lb.name == name)
    }
}

impl fmt::Display for ResolvedInventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reachable = self
            .virtual_machines
            .iter()
            .filter(|vm| vm.winrm_https.is_some())
            .count();
        write!(
            f,
            "{} VMs ({} with WinRM endpoint), {} load balancers",
            self.virtual_machines.len(),
            reachable,
            self.load_balancers.len()
        )
    }
}
