//! Rescan admission filters (spec §4.4).
//!
//! Grounded on the teacher's `scanners.rs` `Device`/`DeviceWithPorts`
//! predicate-style helpers, generalized into standalone filter functions
//! over the richer `Network`/`Device` model.

use crate::model::{device::Device, network::Network, timestamp::Timestamp};

/// Admits networks whose `last_scan` is zero (never scanned) or older than
/// `interval_secs`.
pub fn network_rescan_filter(network: &Network, now: Timestamp, interval_secs: u64) -> bool {
    network.last_scan.is_stale(now, interval_secs)
}

/// Admits devices whose SNMP ARP table is known present and whose
/// `last_arp_table_scan` is stale. A zero `last_arp_table_scan` admits the
/// device for its first walk, unless `has_arp_table` is known false --
/// a device that was already checked and found to have no ARP table is
/// never retried.
pub fn snmp_arp_table_rescan_filter(device: &Device, now: Timestamp, interval_secs: u64) -> bool {
    let snmp = &device.snmp;
    if !snmp.has_arp_table && !snmp.last_arp_table_scan.is_zero() {
        return false;
    }
    snmp.has_arp_table && snmp.last_arp_table_scan.is_stale(now, interval_secs)
}

/// Admits devices whose SNMP interface table is known present and whose
/// `last_interfaces_scan` is stale, with the same "already confirmed
/// absent" exclusion as [`snmp_arp_table_rescan_filter`].
pub fn snmp_interface_rescan_filter(device: &Device, now: Timestamp, interval_secs: u64) -> bool {
    let snmp = &device.snmp;
    if !snmp.has_interfaces && !snmp.last_interfaces_scan.is_zero() {
        return false;
    }
    snmp.has_interfaces && snmp.last_interfaces_scan.is_stale(now, interval_secs)
}

#[cfg(test)]
#[path = "./filters_tests.rs"]
mod tests;
