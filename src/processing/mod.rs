//! Correlation of raw inventory into the resolved view.
//!
//! This module contains the resolution logic:
//! - [`index`] - Lookup indices built from one snapshot
//! - [`correlate`] - Load balancer and virtual machine resolution

mod correlate;
mod index;

// Re-export public functions
pub use correlate::{correlate, find_winrm_endpoint, resolve_load_balancer, resolve_virtual_machine};
pub use index::{
    build_address_index, build_ip_configuration_index, build_nat_rule_index, id_key,
    resolve_front_end_address, AddressIndex, CorrelationIndex, IpConfigurationIndex, NatEndpoint,
    NatRuleIndex,
};
