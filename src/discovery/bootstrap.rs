//! First-run network bootstrap (spec §4.4).
//!
//! Grounded on `network.rs`'s `usable_interfaces` (itself adapted from the
//! teacher's interface enumeration), reused here instead of duplicated:
//! every interface already rejects loopback and down links.

use crate::{model::network::Network, network::usable_interfaces};

/// On first startup with an empty network store, enumerates local
/// interfaces and returns one freshly-discovered [`Network`] per distinct
/// assigned prefix.
pub fn bootstrap_networks() -> Vec<Network> {
    let mut networks = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for interface in usable_interfaces() {
        let key = interface.prefix.to_string();
        if seen.insert(key) {
            networks.push(Network::new(interface.prefix));
        }
    }

    networks
}

#[cfg(test)]
#[path = "./bootstrap_tests.rs"]
mod tests;
