//! Per-network address enumerator (spec §4.4).
//!
//! Grounded on `targets/ips.rs`'s `IPTargets::lazy_loop`, which streams
//! every host in a CIDR block through a callback rather than materializing
//! the full address list; adapted to iterate a `Prefix` directly (inclusive
//! of network base and broadcast, since the spec makes no attempt to
//! exclude them) and to consult a cancellation flag between sends.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    error::Result,
    model::{addr::Addr, network::Network},
};

/// Streams every addressable host in `network`'s prefix to `cb`, in
/// ascending order. IPv6 networks are skipped entirely (spec §1
/// Non-goals). Checks `cancelled` before each iteration and before each
/// callback invocation, returning early without error if it is set.
pub fn enumerate(
    network: &Network,
    cancelled: &AtomicBool,
    mut cb: impl FnMut(Addr) -> Result<()>,
) -> Result<()> {
    if network.prefix.is_ipv6() {
        return Ok(());
    }

    let base = match network.prefix.network().ip() {
        std::net::IpAddr::V4(v4) => u32::from(v4),
        std::net::IpAddr::V6(_) => return Ok(()),
    };
    let host_bits = 32 - network.prefix.prefix_len() as u32;
    let count: u64 = 1u64 << host_bits;

    for offset in 0..count {
        if cancelled.load(Ordering::Relaxed) {
            return Ok(());
        }
        let addr = Addr::from_v4(Ipv4Addr::from(base.wrapping_add(offset as u32)));
        if cancelled.load(Ordering::Relaxed) {
            return Ok(());
        }
        cb(addr)?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "./network_scan_tests.rs"]
mod tests;
