//! Lookup indices built from one inventory snapshot.
//!
//! All keys are ARM ids lower-cased, ARM returns the same id with different
//! casing depending on which resource embeds it.

use crate::config::WINRM_HTTPS_PORT;
use crate::error::{InventoryError, ResourceType};
use crate::models::{InventorySnapshot, LoadBalancer, NetworkInterface, PublicIpAddress};
use std::collections::HashMap;

/// Normalise an ARM id for use as an index key.
pub fn id_key(id: &str) -> String {
    id.to_ascii_lowercase()
}

/// Public IP id -> reachable address (fqdn, else IP literal).
pub type AddressIndex<'a> = HashMap<String, &'a str>;

/// IP configuration id -> owning network interface name.
pub type IpConfigurationIndex<'a> = HashMap<String, &'a str>;

/// Inbound NAT rule id -> public endpoint it forwards WinRM HTTPS from.
pub type NatRuleIndex<'a> = HashMap<String, NatEndpoint<'a>>;

/// Public side of a WinRM HTTPS NAT rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NatEndpoint<'a> {
    pub front_end_port: u16,
    pub public_address: Option<&'a str>,
}

/// Build the address resolution index. Addresses with neither fqdn nor IP are left out.
pub fn build_address_index(public_ips: &[PublicIpAddress]) -> AddressIndex<'_> {
    public_ips
        .iter()
        .filter_map(|pip| {
            pip.reachable_address()
                .map(|address| (id_key(&pip.id), address))
        })
        .collect()
}

/// Build the IP-configuration to interface index. Last write wins on duplicate ids.
pub fn build_ip_configuration_index(nics: &[NetworkInterface]) -> IpConfigurationIndex<'_> {
    let mut index = HashMap::new();
    for nic in nics {
        for ipc in nic.ip_configurations() {
            if let Some(previous) = index.insert(id_key(&ipc.id), nic.name.as_str()) {
                log::warn!(
                    "IP configuration {} listed by both {previous} and {}",
                    ipc.id,
                    nic.name
                );
            }
        }
    }
    index
}

/// Resolve the address of a load balancer's first front-end IP configuration.
///
/// A load balancer without any front-end configuration is malformed. A front-end
/// without a public IP, or with one that does not resolve, yields `None`.
pub fn resolve_front_end_address<'a>(
    lb: &LoadBalancer,
    addresses: &AddressIndex<'a>,
) -> Result<Option<&'a str>, InventoryError> {
    let front_end = lb
        .properties
        .frontend_ip_configurations
        .first()
        .ok_or_else(|| InventoryError::MalformedResource {
            resource_type: ResourceType::LoadBalancers,
            id: lb.id.clone(),
            reason: "no frontend IP configurations".to_string(),
        })?;

    Ok(front_end
        .properties
        .public_ip_address
        .as_ref()
        .and_then(|pip| addresses.get(&id_key(&pip.id)).copied()))
}

/// Build the NAT-rule to endpoint index over all load balancers.
///
/// Only rules forwarding to the WinRM HTTPS back-end port and bound to a
/// back-end IP configuration are indexed.
pub fn build_nat_rule_index<'a>(
    lbs: &[LoadBalancer],
    addresses: &AddressIndex<'a>,
) -> Result<NatRuleIndex<'a>, InventoryError> {
    let mut index = HashMap::new();
    for lb in lbs {
        let public_address = resolve_front_end_address(lb, addresses)?;
        for rule in &lb.properties.inbound_nat_rules {
            let props = &rule.properties;
            let is_winrm = props.backend_port == Some(WINRM_HTTPS_PORT);
            if !is_winrm || props.backend_ip_configuration.is_none() {
                continue;
            }
            let front_end_port = props.frontend_port.ok_or_else(|| {
                InventoryError::MalformedResource {
                    resource_type: ResourceType::LoadBalancers,
                    id: rule.id.clone(),
                    reason: "inbound NAT rule without frontendPort".to_string(),
                }
            })?;
            index.insert(
                id_key(&rule.id),
                NatEndpoint {
                    front_end_port,
                    public_address,
                },
            );
        }
    }
    Ok(index)
}

/// The indices the correlator resolves references against.
#[derive(Debug)]
pub struct CorrelationIndex<'a> {
    pub addresses: AddressIndex<'a>,
    pub ip_configurations: IpConfigurationIndex<'a>,
    pub nat_rules: NatRuleIndex<'a>,
    /// Network interface id -> record, for VM network profiles.
    pub network_interfaces: HashMap<String, &'a NetworkInterface>,
}

impl<'a> CorrelationIndex<'a> {
    /// Build every index from one snapshot.
    pub fn build(snapshot: &'a InventorySnapshot) -> Result<CorrelationIndex<'a>, InventoryError> {
        let addresses = build_address_index(&snapshot.public_ip_addresses);
        let ip_configurations = build_ip_configuration_index(&snapshot.network_interfaces);
        let nat_rules = build_nat_rule_index(&snapshot.load_balancers, &addresses)?;
        let network_interfaces = snapshot
            .network_interfaces
            .iter()
            .map(|nic| (id_key(&nic.id), nic))
            .collect();

        log::debug!(
            "indexed {} addresses, {} ip configurations, {} winrm nat rules",
            addresses.len(),
            ip_configurations.len(),
            nat_rules.len()
        );

        Ok(CorrelationIndex {
            addresses,
            ip_configurations,
            nat_rules,
            network_interfaces,
        })
    }

    pub fn address(&self, public_ip_id: &str) -> Option<&'a str> {
        self.addresses.get(&id_key(public_ip_id)).copied()
    }

    pub fn interface_name_of(&self, ip_configuration_id: &str) -> Option<&'a str> {
        self.ip_configurations
            .get(&id_key(ip_configuration_id))
            .copied()
    }

    pub fn nat_endpoint(&self, rule_id: &str) -> Option<NatEndpoint<'a>> {
        self.nat_rules.get(&id_key(rule_id)).copied()
    }

    pub fn network_interface(&self, nic_id: &str) -> Option<&'a NetworkInterface> {
        self.network_interfaces.get(&id_key(nic_id)).copied()
    }
}
