//! Reverse DNS enrichment (spec §4.5 "DNS").
//!
//! Lifted from the teacher's `scanners/arp_scanner.rs`
//! (`dns_lookup::lookup_addr(&ip4.into()).unwrap_or_default()`), generalized
//! to any `Addr` rather than only a just-ARP-discovered IPv4.

use log::debug;

use crate::model::addr::Addr;

/// Reverse-resolves `addr`, returning `None` on lookup failure or an empty
/// hostname.
pub fn resolve(addr: Addr) -> Option<String> {
    match dns_lookup::lookup_addr(&addr.ip()) {
        Ok(name) if !name.is_empty() => {
            debug!("resolved {} to {}", addr, name);
            Some(name)
        }
        Ok(_) => None,
        Err(e) => {
            debug!("reverse dns lookup for {} failed: {}", addr, e);
            None
        }
    }
}

#[cfg(test)]
#[path = "./dns_tests.rs"]
mod tests;
