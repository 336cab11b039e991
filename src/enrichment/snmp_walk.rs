//! SNMP-agent-as-source-of-truth enrichment (spec §4.5 "SNMP interfaces" and
//! "SNMP ARP table").
//!
//! Grounded on `probes::snmp::SnmpProbe`'s `walk_interface_prefixes` /
//! `walk_arp_table`; this module is the thin translation from a device's
//! stored SNMP credentials into the prefixes/addresses those walks surface.

use std::time::Duration;

use crate::{
    error::{MasonError, Result},
    model::{addr::Addr, device::Device, mac::Mac, prefix::Prefix},
    probes::snmp::SnmpProbe,
};

fn probe_for(device: &Device, timeout: Duration) -> Result<SnmpProbe> {
    let target = device
        .identity
        .addr
        .as_v4()
        .ok_or_else(|| MasonError::Ipv6ExcludedFromDiscovery(device.identity.addr.to_string()))?;

    SnmpProbe::builder()
        .target(target)
        .port(device.snmp.port)
        .community(device.snmp.community.clone())
        .timeout(timeout)
        .build()
        .map_err(|e| MasonError::Wire(e.to_string()))
}

/// Walks `device`'s `ipAdEntNetMask` table, returning every prefix it
/// advertises. A malformed row is skipped rather than propagated, since a
/// single bad row shouldn't fail the whole walk.
pub fn discover_networks(device: &Device, timeout: Duration) -> Result<Vec<Prefix>> {
    let probe = probe_for(device, timeout)?;
    let rows = probe.walk_interface_prefixes()?;

    Ok(rows
        .into_iter()
        .filter_map(|row| Prefix::new(row.address, row.prefix_len).ok())
        .collect())
}

/// Walks `device`'s `ipNetToMediaPhysAddress` table, returning every
/// `{Addr, MAC}` row it advertises.
pub fn discover_devices(device: &Device, timeout: Duration) -> Result<Vec<(Addr, Mac)>> {
    let probe = probe_for(device, timeout)?;
    let rows = probe.walk_arp_table()?;

    Ok(rows.into_iter().map(|row| (row.address, row.mac)).collect())
}

#[cfg(test)]
#[path = "./snmp_walk_tests.rs"]
mod tests;
