//! Correlation of a snapshot into the resolved inventory.

use super::index::CorrelationIndex;
use crate::config::WINRM_HTTPS_PORT;
use crate::error::InventoryError;
use crate::models::{
    InventorySnapshot, LoadBalancer, NetworkInterface, ResolvedInventory, ResolvedLoadBalancer,
    ResolvedVirtualMachine, VirtualMachine, WinRmEndpoint,
};

/// Resolve every load balancer and virtual machine of a snapshot.
///
/// Dangling references resolve to nothing. The only failures are malformed
/// records the indices cannot be built from.
pub fn correlate(snapshot: &InventorySnapshot) -> Result<ResolvedInventory, InventoryError> {
    let index = CorrelationIndex::build(snapshot)?;

    let load_balancers = snapshot
        .load_balancers
        .iter()
        .map(|lb| resolve_load_balancer(lb, &index))
        .collect::<Result<Vec<_>, _>>()?;

    let virtual_machines = snapshot
        .virtual_machines
        .iter()
        .map(|vm| resolve_virtual_machine(vm, &index))
        .collect();

    Ok(ResolvedInventory {
        virtual_machines,
        load_balancers,
    })
}

pub fn resolve_load_balancer(
    lb: &LoadBalancer,
    index: &CorrelationIndex<'_>,
) -> Result<ResolvedLoadBalancer, InventoryError> {
    let front_end_public_address =
        super::index::resolve_front_end_address(lb, &index.addresses)?.map(str::to_string);

    let front_end_ports_in_use = lb
        .properties
        .inbound_nat_rules
        .iter()
        .filter_map(|rule| rule.properties.frontend_port)
        .collect();

    let mut backend_nic_names = Vec::new();
    for pool in &lb.properties.backend_address_pools {
        for ipc in &pool.properties.backend_ip_configurations {
            match index.interface_name_of(&ipc.id) {
                Some(nic) => backend_nic_names.push(nic.to_string()),
                None => log::warn!(
                    "load balancer {}: backend ip configuration {} not found",
                    lb.name,
                    ipc.id
                ),
            }
        }
    }

    Ok(ResolvedLoadBalancer {
        name: lb.name.clone(),
        front_end_public_address,
        front_end_ports_in_use,
        backend_nic_names,
    })
}

pub fn resolve_virtual_machine(
    vm: &VirtualMachine,
    index: &CorrelationIndex<'_>,
) -> ResolvedVirtualMachine {
    let nics = network_interfaces_of(vm, index);
    let winrm_https = find_winrm_endpoint(&nics, index);
    if winrm_https.is_none() {
        log::info!("vm {}: no WinRM HTTPS endpoint found", vm.name);
    }

    ResolvedVirtualMachine {
        name: vm.name.clone(),
        network_interfaces: nics.iter().map(|nic| nic.name.clone()).collect(),
        tags: vm.tags.clone(),
        winrm_https,
    }
}

/// The VM's network interfaces in profile order, skipping references not in the snapshot.
fn network_interfaces_of<'a>(
    vm: &VirtualMachine,
    index: &CorrelationIndex<'a>,
) -> Vec<&'a NetworkInterface> {
    vm.network_interface_refs()
        .iter()
        .filter_map(|nic_ref| {
            let nic = index.network_interface(&nic_ref.id);
            if nic.is_none() {
                log::warn!("vm {}: network interface {} not found", vm.name, nic_ref.id);
            }
            nic
        })
        .collect()
}

/// First WinRM HTTPS endpoint reachable through the given interfaces.
///
/// Interfaces are tried in order. On each one a public IP bound directly to an
/// IP configuration is preferred, the port then being the WinRM HTTPS port.
/// Otherwise the first of its inbound NAT rules found among the indexed WinRM
/// rules gives the rule's front-end port and the load balancer's address,
/// which is absent for a load balancer without public front end.
pub fn find_winrm_endpoint(
    nics: &[&NetworkInterface],
    index: &CorrelationIndex<'_>,
) -> Option<WinRmEndpoint> {
    nics.iter()
        .find_map(|nic| direct_endpoint(nic, index).or_else(|| nat_endpoint(nic, index)))
}

fn direct_endpoint(nic: &NetworkInterface, index: &CorrelationIndex<'_>) -> Option<WinRmEndpoint> {
    nic.ip_configurations().iter().find_map(|ipc| {
        let pip = ipc.properties.public_ip_address.as_ref()?;
        index.address(&pip.id).map(|address| WinRmEndpoint {
            port: WINRM_HTTPS_PORT,
            address: Some(address.to_string()),
        })
    })
}

fn nat_endpoint(nic: &NetworkInterface, index: &CorrelationIndex<'_>) -> Option<WinRmEndpoint> {
    nic.inbound_nat_rules()
        .find_map(|rule| index.nat_endpoint(&rule.id))
        .map(|endpoint| WinRmEndpoint {
            port: endpoint.front_end_port,
            address: endpoint.public_address.map(str::to_string),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(json: &str) -> InventorySnapshot {
        serde_json::from_str(json).expect("Error parsing test snapshot")
    }

    const LB_SCENARIO: &str = r#"{
        "publicIPAddresses": [
            {"id": "pip-lb", "properties": {"ipAddress": "20.0.0.1", "dnsSettings": {"fqdn": "lb1.example.com"}}}
        ],
        "loadBalancers": [{
            "id": "lb-1", "name": "LB1",
            "properties": {
                "frontendIPConfigurations": [{"id": "fe-1", "properties": {"publicIPAddress": {"id": "pip-lb"}}}],
                "inboundNatRules": [{"id": "rule-1", "properties": {
                    "frontendPort": 55001, "backendPort": 5986, "backendIPConfiguration": {"id": "ipc-1"}}}],
                "backendAddressPools": [{"id": "pool-1", "properties": {
                    "backendIPConfigurations": [{"id": "ipc-1"}, {"id": "ipc-gone"}]}}]
            }
        }],
        "networkInterfaces": [{
            "id": "nic-1-id", "name": "nic-1",
            "properties": {"ipConfigurations": [{"id": "ipc-1", "properties": {
                "loadBalancerInboundNatRules": [{"id": "rule-1"}]}}]}
        }],
        "virtualMachines": [
            {"id": "vm-1-id", "name": "vm-1", "properties": {"networkProfile": {"networkInterfaces": [{"id": "nic-1-id"}]}}},
            {"id": "vm-2-id", "name": "vm-2", "tags": {"role": "db"}, "properties": {}}
        ]
    }"#;

    #[test]
    fn test_load_balancer_nat_scenario() {
        let inv = correlate(&snapshot(LB_SCENARIO)).expect("correlate");

        let lb = inv.load_balancer("LB1").expect("LB1");
        assert_eq!(lb.front_end_public_address.as_deref(), Some("lb1.example.com"));
        assert_eq!(lb.front_end_ports_in_use, vec![55001]);
        assert_eq!(lb.backend_nic_names, vec!["nic-1".to_string()]);

        let vm = inv.virtual_machine("vm-1").expect("vm-1");
        assert_eq!(vm.network_interfaces, vec!["nic-1".to_string()]);
        assert_eq!(
            vm.winrm_https,
            Some(WinRmEndpoint {
                port: 55001,
                address: Some("lb1.example.com".to_string())
            })
        );
    }

    #[test]
    fn test_vm_without_network_profile_has_no_endpoint() {
        let inv = correlate(&snapshot(LB_SCENARIO)).expect("correlate");
        let vm = inv.virtual_machine("vm-2").expect("vm-2");
        assert!(vm.winrm_https.is_none());
        assert!(vm.network_interfaces.is_empty());
        assert_eq!(vm.tags.get("role").map(String::as_str), Some("db"));
    }

    #[test]
    fn test_direct_public_ip_beats_later_nat_rule() {
        let snap = snapshot(
            r#"{
            "publicIPAddresses": [
                {"id": "pip-vm", "properties": {"ipAddress": "10.0.0.5"}},
                {"id": "pip-lb", "properties": {"dnsSettings": {"fqdn": "lb.example.com"}}}
            ],
            "loadBalancers": [{"id": "lb", "name": "lb", "properties": {
                "frontendIPConfigurations": [{"properties": {"publicIPAddress": {"id": "pip-lb"}}}],
                "inboundNatRules": [{"id": "rule", "properties": {
                    "frontendPort": 50000, "backendPort": 5986, "backendIPConfiguration": {"id": "ipc-b"}}}]}}],
            "networkInterfaces": [
                {"id": "nic-a", "name": "nic-a", "properties": {"ipConfigurations": [
                    {"id": "ipc-a", "properties": {"publicIPAddress": {"id": "pip-vm"}}}]}},
                {"id": "nic-b", "name": "nic-b", "properties": {"ipConfigurations": [
                    {"id": "ipc-b", "properties": {"loadBalancerInboundNatRules": [{"id": "rule"}]}}]}}
            ],
            "virtualMachines": [{"id": "vm", "name": "vm", "properties": {"networkProfile": {
                "networkInterfaces": [{"id": "nic-a"}, {"id": "nic-b"}]}}}]
        }"#,
        );
        let inv = correlate(&snap).expect("correlate");
        assert_eq!(
            inv.virtual_machines[0].winrm_https,
            Some(WinRmEndpoint {
                port: WINRM_HTTPS_PORT,
                address: Some("10.0.0.5".to_string())
            })
        );
    }

    #[test]
    fn test_earlier_interface_nat_rule_wins_over_later_direct_ip() {
        let snap = snapshot(
            r#"{
            "publicIPAddresses": [
                {"id": "pip-vm", "properties": {"ipAddress": "10.0.0.5"}},
                {"id": "pip-lb", "properties": {"dnsSettings": {"fqdn": "lb.example.com"}}}
            ],
            "loadBalancers": [{"id": "lb", "name": "lb", "properties": {
                "frontendIPConfigurations": [{"properties": {"publicIPAddress": {"id": "pip-lb"}}}],
                "inboundNatRules": [{"id": "rule", "properties": {
                    "frontendPort": 50000, "backendPort": 5986, "backendIPConfiguration": {"id": "ipc-a"}}}]}}],
            "networkInterfaces": [
                {"id": "nic-a", "name": "nic-a", "properties": {"ipConfigurations": [
                    {"id": "ipc-a", "properties": {"loadBalancerInboundNatRules": [{"id": "rule"}]}}]}},
                {"id": "nic-b", "name": "nic-b", "properties": {"ipConfigurations": [
                    {"id": "ipc-b", "properties": {"publicIPAddress": {"id": "pip-vm"}}}]}}
            ],
            "virtualMachines": [{"id": "vm", "name": "vm", "properties": {"networkProfile": {
                "networkInterfaces": [{"id": "nic-a"}, {"id": "nic-b"}]}}}]
        }"#,
        );
        let inv = correlate(&snap).expect("correlate");
        assert_eq!(
            inv.virtual_machines[0].winrm_https,
            Some(WinRmEndpoint {
                port: 50000,
                address: Some("lb.example.com".to_string())
            })
        );
    }

    #[test]
    fn test_unresolved_public_ip_falls_through_to_nat_rule() {
        let snap = snapshot(
            r#"{
            "publicIPAddresses": [{"id": "pip-lb", "properties": {"ipAddress": "20.1.1.1"}}],
            "loadBalancers": [{"id": "lb", "name": "lb", "properties": {
                "frontendIPConfigurations": [{"properties": {"publicIPAddress": {"id": "pip-lb"}}}],
                "inboundNatRules": [{"id": "rule", "properties": {
                    "frontendPort": 50001, "backendPort": 5986, "backendIPConfiguration": {"id": "ipc"}}}]}}],
            "networkInterfaces": [{"id": "nic", "name": "nic", "properties": {"ipConfigurations": [
                {"id": "ipc", "properties": {
                    "publicIPAddress": {"id": "pip-missing"},
                    "loadBalancerInboundNatRules": [{"id": "rule"}]}}]}}],
            "virtualMachines": [{"id": "vm", "name": "vm", "properties": {"networkProfile": {
                "networkInterfaces": [{"id": "nic"}]}}}]
        }"#,
        );
        let inv = correlate(&snap).expect("correlate");
        assert_eq!(
            inv.virtual_machines[0].winrm_https,
            Some(WinRmEndpoint {
                port: 50001,
                address: Some("20.1.1.1".to_string())
            })
        );
    }

    #[test]
    fn test_nat_rule_on_internal_load_balancer_keeps_port() {
        let snap = snapshot(
            r#"{
            "loadBalancers": [{"id": "lb", "name": "lb-internal", "properties": {
                "frontendIPConfigurations": [{"properties": {}}],
                "inboundNatRules": [{"id": "rule", "properties": {
                    "frontendPort": 50001, "backendPort": 5986, "backendIPConfiguration": {"id": "ipc"}}}]}}],
            "networkInterfaces": [{"id": "nic", "name": "nic", "properties": {"ipConfigurations": [
                {"id": "ipc", "properties": {"loadBalancerInboundNatRules": [{"id": "rule"}]}}]}}],
            "virtualMachines": [{"id": "vm", "name": "vm", "properties": {"networkProfile": {
                "networkInterfaces": [{"id": "nic"}]}}}]
        }"#,
        );
        let inv = correlate(&snap).expect("correlate");
        assert_eq!(
            inv.virtual_machines[0].winrm_https,
            Some(WinRmEndpoint {
                port: 50001,
                address: None
            })
        );
        assert!(inv.load_balancers[0].front_end_public_address.is_none());
        assert_eq!(inv.load_balancers[0].front_end_ports_in_use, vec![50001]);
    }

    #[test]
    fn test_first_indexed_nat_rule_stops_search() {
        let snap = snapshot(
            r#"{
            "publicIPAddresses": [{"id": "pip-pub", "properties": {"dnsSettings": {"fqdn": "pub.example.com"}}}],
            "loadBalancers": [
                {"id": "lb-int", "name": "lb-int", "properties": {
                    "frontendIPConfigurations": [{"properties": {}}],
                    "inboundNatRules": [{"id": "rule-int", "properties": {
                        "frontendPort": 50001, "backendPort": 5986, "backendIPConfiguration": {"id": "ipc"}}}]}},
                {"id": "lb-pub", "name": "lb-pub", "properties": {
                    "frontendIPConfigurations": [{"properties": {"publicIPAddress": {"id": "pip-pub"}}}],
                    "inboundNatRules": [{"id": "rule-pub", "properties": {
                        "frontendPort": 50002, "backendPort": 5986, "backendIPConfiguration": {"id": "ipc"}}}]}}
            ],
            "networkInterfaces": [{"id": "nic", "name": "nic", "properties": {"ipConfigurations": [
                {"id": "ipc", "properties": {"loadBalancerInboundNatRules": [{"id": "rule-int"}, {"id": "rule-pub"}]}}]}}],
            "virtualMachines": [{"id": "vm", "name": "vm", "properties": {"networkProfile": {
                "networkInterfaces": [{"id": "nic"}]}}}]
        }"#,
        );
        let inv = correlate(&snap).expect("correlate");
        assert_eq!(
            inv.virtual_machines[0].winrm_https,
            Some(WinRmEndpoint {
                port: 50001,
                address: None
            })
        );
    }

    #[test]
    fn test_first_interface_direct_ip_wins() {
        let snap = snapshot(
            r#"{
            "publicIPAddresses": [
                {"id": "pip-a", "properties": {"ipAddress": "20.0.0.1"}},
                {"id": "pip-b", "properties": {"ipAddress": "20.0.0.2"}}
            ],
            "networkInterfaces": [
                {"id": "nic-a", "name": "nic-a", "properties": {"ipConfigurations": [
                    {"id": "ipc-a", "properties": {"publicIPAddress": {"id": "pip-a"}}}]}},
                {"id": "nic-b", "name": "nic-b", "properties": {"ipConfigurations": [
                    {"id": "ipc-b", "properties": {"publicIPAddress": {"id": "pip-b"}}}]}}
            ],
            "virtualMachines": [{"id": "vm", "name": "vm", "properties": {"networkProfile": {
                "networkInterfaces": [{"id": "nic-b"}, {"id": "nic-a"}]}}}]
        }"#,
        );
        let inv = correlate(&snap).expect("correlate");
        assert_eq!(
            inv.virtual_machines[0].winrm_https,
            Some(WinRmEndpoint {
                port: WINRM_HTTPS_PORT,
                address: Some("20.0.0.2".to_string())
            })
        );
    }

    #[test]
    fn test_first_interface_nat_rule_wins() {
        let snap = snapshot(
            r#"{
            "publicIPAddresses": [{"id": "pip-lb", "properties": {"dnsSettings": {"fqdn": "lb.example.com"}}}],
            "loadBalancers": [{"id": "lb", "name": "lb", "properties": {
                "frontendIPConfigurations": [{"properties": {"publicIPAddress": {"id": "pip-lb"}}}],
                "inboundNatRules": [
                    {"id": "rule-a", "properties": {
                        "frontendPort": 50001, "backendPort": 5986, "backendIPConfiguration": {"id": "ipc-a"}}},
                    {"id": "rule-b", "properties": {
                        "frontendPort": 50002, "backendPort": 5986, "backendIPConfiguration": {"id": "ipc-b"}}}
                ]}}],
            "networkInterfaces": [
                {"id": "nic-a", "name": "nic-a", "properties": {"ipConfigurations": [
                    {"id": "ipc-a", "properties": {"loadBalancerInboundNatRules": [{"id": "rule-a"}]}}]}},
                {"id": "nic-b", "name": "nic-b", "properties": {"ipConfigurations": [
                    {"id": "ipc-b", "properties": {"loadBalancerInboundNatRules": [{"id": "rule-b"}]}}]}}
            ],
            "virtualMachines": [{"id": "vm", "name": "vm", "properties": {"networkProfile": {
                "networkInterfaces": [{"id": "nic-b"}, {"id": "nic-a"}]}}}]
        }"#,
        );
        let inv = correlate(&snap).expect("correlate");
        assert_eq!(
            inv.virtual_machines[0].winrm_https,
            Some(WinRmEndpoint {
                port: 50002,
                address: Some("lb.example.com".to_string())
            })
        );
    }

    #[test]
    fn test_direct_ip_beats_nat_rule_listed_first_on_same_interface() {
        let snap = snapshot(
            r#"{
            "publicIPAddresses": [
                {"id": "pip-vm", "properties": {"ipAddress": "20.0.0.9"}},
                {"id": "pip-lb", "properties": {"dnsSettings": {"fqdn": "lb.example.com"}}}
            ],
            "loadBalancers": [{"id": "lb", "name": "lb", "properties": {
                "frontendIPConfigurations": [{"properties": {"publicIPAddress": {"id": "pip-lb"}}}],
                "inboundNatRules": [{"id": "rule", "properties": {
                    "frontendPort": 50001, "backendPort": 5986, "backendIPConfiguration": {"id": "ipc-1"}}}]}}],
            "networkInterfaces": [{"id": "nic", "name": "nic", "properties": {"ipConfigurations": [
                {"id": "ipc-1", "properties": {"loadBalancerInboundNatRules": [{"id": "rule"}]}},
                {"id": "ipc-2", "properties": {"publicIPAddress": {"id": "pip-vm"}}}]}}],
            "virtualMachines": [{"id": "vm", "name": "vm", "properties": {"networkProfile": {
                "networkInterfaces": [{"id": "nic"}]}}}]
        }"#,
        );
        let inv = correlate(&snap).expect("correlate");
        assert_eq!(
            inv.virtual_machines[0].winrm_https,
            Some(WinRmEndpoint {
                port: WINRM_HTTPS_PORT,
                address: Some("20.0.0.9".to_string())
            })
        );
    }

    #[test]
    fn test_dangling_nic_reference_is_skipped() {
        let snap = snapshot(
            r#"{"virtualMachines": [{"id": "vm", "name": "vm", "properties": {"networkProfile": {
                "networkInterfaces": [{"id": "nic-deleted"}]}}}]}"#,
        );
        let inv = correlate(&snap).expect("correlate");
        assert!(inv.virtual_machines[0].network_interfaces.is_empty());
        assert!(inv.virtual_machines[0].winrm_https.is_none());
    }

    #[test]
    fn test_front_end_ports_keep_rule_order_and_duplicates() {
        let snap = snapshot(
            r#"{"loadBalancers": [{"id": "lb", "name": "lb", "properties": {
                "frontendIPConfigurations": [{"properties": {}}],
                "inboundNatRules": [
                    {"id": "r1", "properties": {"frontendPort": 50002, "backendPort": 3389}},
                    {"id": "r2", "properties": {"frontendPort": 50001, "backendPort": 5986}},
                    {"id": "r3", "properties": {"frontendPort": 50002, "backendPort": 22}}
                ]}}]}"#,
        );
        let inv = correlate(&snap).expect("correlate");
        assert_eq!(
            inv.load_balancers[0].front_end_ports_in_use,
            vec![50002, 50001, 50002]
        );
    }

    #[test]
    fn test_load_balancer_without_front_end_fails_pass() {
        let snap = snapshot(
            r#"{"loadBalancers": [{"id": "lb-bad", "name": "lb-bad", "properties": {}}],
                "virtualMachines": [{"id": "vm", "name": "vm"}]}"#,
        );
        let err = correlate(&snap).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::MalformedResource { ref id, .. } if id == "lb-bad"
        ));
    }

    #[test]
    fn test_correlate_is_idempotent() {
        let snap = snapshot(LB_SCENARIO);
        let first = correlate(&snap).expect("first");
        let second = correlate(&snap).expect("second");
        assert_eq!(first, second);
    }
}
