//! ASN (Autonomous System Number) catalogue entry (spec §3)

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// An inclusive IPv4 address range, used for ASN range lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRange {
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
}

impl IpRange {
    /// Returns true if `addr` falls within the inclusive range
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) >= u32::from(self.start) && u32::from(addr) <= u32::from(self.end)
    }
}

/// Routing-domain identifier mapped to an owning organization and country
/// (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asn {
    pub asn: String,
    pub country: String,
    pub name: String,
    pub ip_range: IpRange,
}

#[cfg(test)]
#[path = "./asn_tests.rs"]
mod tests;
