//! Typed ARM records for the four collections of a resource group.
//!
//! Only the fields the correlator reads are modelled; everything else in the
//! ARM payload is ignored by serde.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reference to another ARM resource.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubResource {
    pub id: String,
}

impl SubResource {
    pub fn new(id: impl Into<String>) -> Self {
        SubResource { id: id.into() }
    }
}

/// Envelope returned by ARM list operations.
#[derive(Serialize, Deserialize, Debug)]
pub struct ArmPage<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}

// Public IP addresses

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PublicIpAddress {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: PublicIpAddressProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PublicIpAddressProperties {
    #[serde(rename = "ipAddress", default)]
    pub ip_address: Option<String>,
    #[serde(rename = "dnsSettings", default)]
    pub dns_settings: Option<DnsSettings>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DnsSettings {
    #[serde(default)]
    pub fqdn: Option<String>,
}

impl PublicIpAddress {
    /// Address a client would connect to: DNS name first, then the IP literal.
    pub fn reachable_address(&self) -> Option<&str> {
        self.properties
            .dns_settings
            .as_ref()
            .and_then(|dns| dns.fqdn.as_deref())
            .filter(|fqdn| !fqdn.is_empty())
            .or(self.properties.ip_address.as_deref())
            .filter(|ip| !ip.is_empty())
    }
}

// Network interfaces

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NetworkInterface {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: NetworkInterfaceProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NetworkInterfaceProperties {
    #[serde(rename = "ipConfigurations", default)]
    pub ip_configurations: Vec<IpConfiguration>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IpConfiguration {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: IpConfigurationProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct IpConfigurationProperties {
    #[serde(rename = "publicIPAddress", default)]
    pub public_ip_address: Option<SubResource>,
    #[serde(rename = "loadBalancerInboundNatRules", default)]
    pub load_balancer_inbound_nat_rules: Vec<SubResource>,
}

impl NetworkInterface {
    pub fn ip_configurations(&self) -> &[IpConfiguration] {
        &self.properties.ip_configurations
    }

    /// NAT rule references of all IP configurations, in listed order.
    pub fn inbound_nat_rules(&self) -> impl Iterator<Item = &SubResource> {
        self.properties
            .ip_configurations
            .iter()
            .flat_map(|ipc| ipc.properties.load_balancer_inbound_nat_rules.iter())
    }
}

// Load balancers

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoadBalancer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: LoadBalancerProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct LoadBalancerProperties {
    #[serde(rename = "frontendIPConfigurations", default)]
    pub frontend_ip_configurations: Vec<FrontendIpConfiguration>,
    #[serde(rename = "inboundNatRules", default)]
    pub inbound_nat_rules: Vec<InboundNatRule>,
    #[serde(rename = "backendAddressPools", default)]
    pub backend_address_pools: Vec<BackendAddressPool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrontendIpConfiguration {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub properties: FrontendIpConfigurationProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FrontendIpConfigurationProperties {
    #[serde(rename = "publicIPAddress", default)]
    pub public_ip_address: Option<SubResource>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InboundNatRule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: InboundNatRuleProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct InboundNatRuleProperties {
    #[serde(rename = "frontendPort", default)]
    pub frontend_port: Option<u16>,
    #[serde(rename = "backendPort", default)]
    pub backend_port: Option<u16>,
    #[serde(rename = "backendIPConfiguration", default)]
    pub backend_ip_configuration: Option<SubResource>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackendAddressPool {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: BackendAddressPoolProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BackendAddressPoolProperties {
    #[serde(rename = "backendIPConfigurations", default)]
    pub backend_ip_configurations: Vec<SubResource>,
}

// Virtual machines

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VirtualMachine {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub properties: VirtualMachineProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct VirtualMachineProperties {
    #[serde(rename = "networkProfile", default)]
    pub network_profile: Option<NetworkProfile>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NetworkProfile {
    #[serde(rename = "networkInterfaces", default)]
    pub network_interfaces: Vec<SubResource>,
}

impl VirtualMachine {
    /// Network interface references in profile order; empty without a profile.
    pub fn network_interface_refs(&self) -> &[SubResource] {
        self.properties
            .network_profile
            .as_ref()
            .map(|p| p.network_interfaces.as_slice())
            .unwrap_or(&[])
    }
}
