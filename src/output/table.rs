//! Table output of the resolved inventory.

use crate::models::{ResolvedInventory, ResolvedLoadBalancer, ResolvedVirtualMachine};
use colored::Colorize;
use itertools::Itertools;

const NONE: &str = "None";

/// Quote a value for a CSV cell and right-align it to `width`.
///
/// Embedded double quotes are doubled.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string().replace('"', "\"\""));
    format!("{quoted:>width$}")
}

/// Rows for virtual machines, header first.
pub fn virtual_machine_rows(vms: &[ResolvedVirtualMachine]) -> Vec<String> {
    let mut rows = vec![format!(
        "{},{},{},{}",
        format_field("vm_name", 24),
        format_field("winrm_address", 40),
        format_field("winrm_port", 12),
        format_field("nics", 30)
    )];
    rows.extend(vms.iter().map(|vm| {
        let (address, port) = match &vm.winrm_https {
            Some(ep) => (
                ep.address.clone().unwrap_or_else(|| NONE.to_string()),
                ep.port.to_string(),
            ),
            None => (NONE.to_string(), NONE.to_string()),
        };
        format!(
            "{},{},{},{}",
            format_field(&vm.name, 24),
            format_field(address, 40),
            format_field(port, 12),
            format_field(vm.network_interfaces.iter().join(" "), 30)
        )
    }));
    rows
}

/// Rows for load balancers, header first.
pub fn load_balancer_rows(lbs: &[ResolvedLoadBalancer]) -> Vec<String> {
    let mut rows = vec![format!(
        "{},{},{},{}",
        format_field("lb_name", 24),
        format_field("front_end_address", 40),
        format_field("ports_in_use", 20),
        format_field("backend_nics", 30)
    )];
    rows.extend(lbs.iter().map(|lb| {
        format!(
            "{},{},{},{}",
            format_field(&lb.name, 24),
            format_field(lb.front_end_public_address.as_deref().unwrap_or(NONE), 40),
            format_field(lb.front_end_ports_in_use.iter().join(" "), 20),
            format_field(lb.backend_nic_names.iter().join(" "), 30)
        )
    }));
    rows
}

/// Both tables, separated by a blank line. VMs without endpoint are highlighted.
pub fn inventory_table(inventory: &ResolvedInventory) -> String {
    let vm_rows = virtual_machine_rows(&inventory.virtual_machines);
    let vm_rows = vm_rows.iter().enumerate().map(|(i, row)| {
        let unreachable = i > 0 && inventory.virtual_machines[i - 1].winrm_https.is_none();
        if unreachable {
            row.yellow().to_string()
        } else {
            row.to_string()
        }
    });
    vm_rows
        .chain(std::iter::once(String::new()))
        .chain(load_balancer_rows(&inventory.load_balancers))
        .join("\n")
}
