//! SNMPv2c Get/BulkWalk probe (spec §4.3 "SNMP")
//!
//! New module: the teacher has no SNMP support at all. Grounded on the
//! `snmp` crate's blocking `SyncSession` (the only SNMP crate in the
//! dependency stack, and a synchronous one, matching the teacher's
//! thread-based rather than async style everywhere else).

use derive_builder::Builder;
use log::debug;
use pnet::util::MacAddr as PnetMacAddr;
use snmp::{SyncSession, Value};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::{
    error::{MasonError, Result},
    model::{addr::Addr, mac::Mac},
};

/// sysDescr.0
pub const OID_SYS_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 1, 0];
/// sysContact.0
pub const OID_SYS_CONTACT: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 4, 0];
/// sysName.0
pub const OID_SYS_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 5, 0];
/// sysLocation.0
pub const OID_SYS_LOCATION: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 6, 0];
/// ipAdEntNetMask subtree -- interface prefixes
pub const OID_IP_AD_ENT_NET_MASK: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 20, 1, 3];
/// ipNetToMediaPhysAddress subtree -- ARP table
pub const OID_IP_NET_TO_MEDIA_PHYS_ADDRESS: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 22, 1, 2];

/// System identity retrieved via `Get` on the four sysXXX scalars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemInfo {
    pub descr: String,
    pub contact: String,
    pub name: String,
    pub location: String,
}

/// `{interface address -> prefix length}` entry yielded by an
/// `ipAdEntNetMask` walk.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfacePrefix {
    pub address: Addr,
    pub prefix_len: u8,
}

/// `{ip -> mac}` entry yielded by an `ipNetToMediaPhysAddress` walk.
#[derive(Debug, Clone, PartialEq)]
pub struct ArpEntry {
    pub address: Addr,
    pub mac: Mac,
}

/// An SNMPv2c session bound to one agent.
#[derive(Builder)]
#[builder(setter(into))]
pub struct SnmpProbe {
    target: Ipv4Addr,
    #[builder(default = "161")]
    port: u16,
    community: String,
    #[builder(default = "Duration::from_secs(2)")]
    timeout: Duration,
}

impl SnmpProbe {
    /// Returns a builder for SnmpProbe
    pub fn builder() -> SnmpProbeBuilder {
        SnmpProbeBuilder::default()
    }

    fn session(&self) -> Result<SyncSession> {
        let addr = SocketAddr::new(self.target.into(), self.port);
        SyncSession::new(addr, self.community.as_bytes(), Some(self.timeout), 0)
            .map_err(classify_io_error)
    }

    /// Retrieves `sysDescr`/`sysContact`/`sysName`/`sysLocation` in a single
    /// request.
    pub fn get_system_info(&self) -> Result<SystemInfo> {
        let mut session = self.session()?;
        let response = session
            .get(&[OID_SYS_DESCR, OID_SYS_CONTACT, OID_SYS_NAME, OID_SYS_LOCATION])
            .map_err(classify_io_error)?;

        let mut info = SystemInfo::default();
        for (oid, value) in response.varbinds {
            let oid: Vec<u32> = oid.to_vec();
            let text = value_to_string(&value);
            if oid == OID_SYS_DESCR {
                info.descr = text;
            } else if oid == OID_SYS_CONTACT {
                info.contact = text;
            } else if oid == OID_SYS_NAME {
                info.name = text;
            } else if oid == OID_SYS_LOCATION {
                info.location = text;
            }
        }

        debug!("snmp system info for {}: {:?}", self.target, info);
        Ok(info)
    }

    /// Walks the `ipAdEntNetMask` subtree, yielding one [`InterfacePrefix`]
    /// per row (the last four octets of each returned OID are the IPv4
    /// address; the value is a 4-byte netmask whose popcount is the prefix
    /// length).
    pub fn walk_interface_prefixes(&self) -> Result<Vec<InterfacePrefix>> {
        let mut prefixes = Vec::new();
        self.bulk_walk(OID_IP_AD_ENT_NET_MASK, |oid, value| {
            let Some(address) = address_from_oid_suffix(oid) else {
                return;
            };
            let Value::IpAddress(mask) = value else {
                return;
            };
            let prefix_len = u32::from_be_bytes(*mask).count_ones() as u8;
            prefixes.push(InterfacePrefix {
                address: Addr::from_v4(address),
                prefix_len,
            });
        })?;
        Ok(prefixes)
    }

    /// Walks the `ipNetToMediaPhysAddress` subtree, yielding one [`ArpEntry`]
    /// per row. Broadcast MACs (`ff:ff:ff:ff:ff:ff`) are dropped.
    pub fn walk_arp_table(&self) -> Result<Vec<ArpEntry>> {
        let mut entries = Vec::new();
        self.bulk_walk(OID_IP_NET_TO_MEDIA_PHYS_ADDRESS, |oid, value| {
            let Some(address) = address_from_oid_suffix(oid) else {
                return;
            };
            let Value::OctetString(bytes) = value else {
                return;
            };
            if bytes.len() != 6 {
                return;
            }
            let mac = Mac::from(PnetMacAddr::new(
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5],
            ));
            if mac.is_broadcast() {
                return;
            }
            entries.push(ArpEntry {
                address: Addr::from_v4(address),
                mac,
            });
        })?;
        Ok(entries)
    }

    /// Walks `root`'s subtree via repeated GETBULK requests, invoking
    /// `visit` once per row still under `root`, stopping at the first row
    /// that falls outside it.
    fn bulk_walk(&self, root: &[u32], mut visit: impl FnMut(&[u32], &Value)) -> Result<()> {
        let mut session = self.session()?;
        let mut cursor: Vec<u32> = root.to_vec();

        loop {
            let response = session
                .getbulk(&[cursor.as_slice()], 0, 10)
                .map_err(classify_io_error)?;

            let mut advanced = false;
            for (oid, value) in response.varbinds {
                let oid: Vec<u32> = oid.to_vec();
                if !oid.starts_with(root) {
                    return Ok(());
                }
                visit(&oid, &value);
                cursor = oid;
                advanced = true;
            }

            if !advanced {
                return Ok(());
            }
        }
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::OctetString(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        other => format!("{other:?}"),
    }
}

/// The last four components of an OID under one of the standard SNMP
/// tables are the dotted IPv4 address the row describes.
fn address_from_oid_suffix(oid: &[u32]) -> Option<Ipv4Addr> {
    let tail = oid.len().checked_sub(4)?;
    let octets = &oid[tail..];
    Some(Ipv4Addr::new(
        octets[0] as u8,
        octets[1] as u8,
        octets[2] as u8,
        octets[3] as u8,
    ))
}

fn classify_io_error(e: std::io::Error) -> MasonError {
    match e.kind() {
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
            MasonError::NoResponseFromRemote(e.to_string())
        }
        std::io::ErrorKind::ConnectionRefused => MasonError::ConnectionRefused(e.to_string()),
        _ => MasonError::Wire(e.to_string()),
    }
}

#[cfg(test)]
#[path = "./snmp_tests.rs"]
mod tests;
