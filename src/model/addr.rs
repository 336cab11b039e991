//! IPv4/IPv6 address wrapper with canonical string round-tripping
//!
//! Grounded on the teacher's `Ipv4Addr`-keyed `Device`/`DeviceWithPorts`
//! (`scanners.rs`), generalized to also admit IPv6 so that SNMP interface
//! walks (spec §4.4/§4.7) can ingest IPv6 prefixes even though the scanner
//! never sweeps them (spec §1 Non-goals).

use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use crate::error::{MasonError, Result};

/// An IPv4 or IPv6 address. Textual representation is canonical; ordering
/// is byte-wise on the packed address (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    try_from = "String",
    into = "String",
    rename_all = "camelCase"
)]
pub struct Addr(IpAddr);

impl Addr {
    /// Wraps an already-parsed `IpAddr`
    pub fn new(ip: IpAddr) -> Self {
        Self(ip)
    }

    /// Wraps an IPv4 address
    pub fn from_v4(ip: Ipv4Addr) -> Self {
        Self(IpAddr::V4(ip))
    }

    /// Returns the wrapped address
    pub fn ip(&self) -> IpAddr {
        self.0
    }

    /// Returns true if this is an IPv4 address
    pub fn is_ipv4(&self) -> bool {
        self.0.is_ipv4()
    }

    /// Returns true if this is an IPv6 address
    pub fn is_ipv6(&self) -> bool {
        self.0.is_ipv6()
    }

    /// Returns the address as an `Ipv4Addr` if it is one
    pub fn as_v4(&self) -> Option<Ipv4Addr> {
        match self.0 {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        }
    }

    /// Returns the packed bytes of the address, for byte-wise ordering and
    /// hashing in storage keys
    pub fn octets(&self) -> Vec<u8> {
        match self.0 {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        }
    }
}

impl PartialOrd for Addr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Addr {
    fn cmp(&self, other: &Self) -> Ordering {
        self.octets().cmp(&other.octets())
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Addr {
    type Err = MasonError;

    fn from_str(s: &str) -> Result<Self> {
        let ip = IpAddr::from_str(s)
            .map_err(|e| MasonError::from_addr_parse_error(s, e))?;
        Ok(Self(ip))
    }
}

impl From<Ipv4Addr> for Addr {
    fn from(value: Ipv4Addr) -> Self {
        Self(IpAddr::V4(value))
    }
}

impl From<Ipv6Addr> for Addr {
    fn from(value: Ipv6Addr) -> Self {
        Self(IpAddr::V6(value))
    }
}

impl From<IpAddr> for Addr {
    fn from(value: IpAddr) -> Self {
        Self(value)
    }
}

impl TryFrom<String> for Addr {
    type Error = MasonError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_str(&value)
    }
}

impl From<Addr> for String {
    fn from(value: Addr) -> Self {
        value.to_string()
    }
}

impl Default for Addr {
    fn default() -> Self {
        Self(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

#[cfg(test)]
#[path = "./addr_tests.rs"]
mod tests;
