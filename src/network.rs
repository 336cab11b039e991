//! Local network interface enumeration
//!
//! Grounded on `r_lanlib::network` (the older generation of the teacher's
//! library still carries this file; the retrieval pack's current `lib/`
//! dropped it but kept `network_tests.rs`). Adapted to surface the crate's
//! own [`Addr`]/[`Prefix`] model types instead of raw strings, and to return
//! [`Result`] rather than `Option` so interface-lookup failures reach the
//! orchestrator as a proper `MasonError` (spec §4.3 bootstrap).

use pnet::{
    datalink,
    ipnetwork::{IpNetwork, Ipv4Network},
    util::MacAddr as PnetMacAddr,
};
use std::net::{Ipv4Addr, TcpListener};

use crate::{
    error::{MasonError, Result},
    model::{addr::Addr, prefix::Prefix},
};

/// A usable local network interface: up, non-loopback, with an assigned
/// IPv4 address.
#[derive(Debug, Clone)]
pub struct Interface {
    pub name: String,
    pub description: String,
    pub mac: PnetMacAddr,
    pub ipv4: Ipv4Addr,
    pub prefix: Prefix,
    pub flags: u32,
    pub index: u32,
}

impl TryFrom<datalink::NetworkInterface> for Interface {
    type Error = MasonError;

    fn try_from(value: datalink::NetworkInterface) -> Result<Self> {
        let mac = value.mac.ok_or_else(|| MasonError::Scan {
            error: "interface has no MAC address".into(),
            addr: None,
            port: None,
        })?;
        let (ipv4, prefix) = ipv4_and_prefix(&value).ok_or_else(|| MasonError::Scan {
            error: "interface has no assigned IPv4 address".into(),
            addr: None,
            port: None,
        })?;

        Ok(Self {
            name: value.name,
            description: value.description,
            flags: value.flags,
            index: value.index,
            mac,
            ipv4,
            prefix,
        })
    }
}

impl From<&Interface> for datalink::NetworkInterface {
    fn from(value: &Interface) -> Self {
        Self {
            name: value.name.clone(),
            description: value.description.clone(),
            index: value.index,
            flags: value.flags,
            mac: Some(value.mac),
            ips: vec![IpNetwork::V4(
                Ipv4Network::new(value.ipv4, value.prefix.prefix_len())
                    .expect("prefix length was already validated by Prefix::new"),
            )],
        }
    }
}

fn ipv4_and_prefix(interface: &datalink::NetworkInterface) -> Option<(Ipv4Addr, Prefix)> {
    let ipnet = interface.ips.iter().find(|i| i.is_ipv4())?;
    let ipv4 = match ipnet.ip() {
        std::net::IpAddr::V4(v4) => v4,
        std::net::IpAddr::V6(_) => return None,
    };
    let prefix = Prefix::new(Addr::from_v4(ipv4), ipnet.prefix()).ok()?;
    Some((ipv4, prefix))
}

/// Every local interface that is up, non-loopback, and has an assigned
/// IPv4 address (spec §4.3 bootstrap: "reject loopback, down, no-address").
pub fn usable_interfaces() -> Vec<Interface> {
    datalink::interfaces()
        .into_iter()
        .filter(|i| i.is_up() && !i.is_loopback())
        .filter_map(|i| Interface::try_from(i).ok())
        .collect()
}

/// Looks up a usable interface by name.
pub fn get_interface(name: &str) -> Result<Interface> {
    datalink::interfaces()
        .into_iter()
        .find(|i| i.name == name)
        .ok_or_else(|| MasonError::Scan {
            error: "no such interface".into(),
            addr: Some(name.to_string()),
            port: None,
        })
        .and_then(Interface::try_from)
}

/// Returns the first usable interface, preferring the stable ordering
/// returned by the platform's interface enumeration.
pub fn get_default_interface() -> Result<Interface> {
    usable_interfaces().into_iter().next().ok_or(MasonError::Scan {
        error: "no usable network interface found".into(),
        addr: None,
        port: None,
    })
}

/// Binds an ephemeral local TCP port and returns it, for use as a scanner's
/// own source port (spec §4.1 ARP probe "on a... source port").
pub fn get_available_port() -> Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .map_err(|e| MasonError::Scan {
            error: e.to_string(),
            addr: None,
            port: None,
        })?;
    let addr = listener.local_addr().map_err(|e| MasonError::Scan {
        error: e.to_string(),
        addr: None,
        port: None,
    })?;
    Ok(addr.port())
}

#[cfg(test)]
#[path = "./network_tests.rs"]
mod tests;
