//! Normalized address prefix (CIDR block)
//!
//! Grounded on the teacher's `targets::ips::IPTargets`, which accepts raw
//! CIDR strings and parses them with `ipnet::Ipv4Net`; here the parsed form
//! is retained as the canonical in-memory representation instead of a
//! string, since the spec requires host-bit normalization and a stable
//! `Prefix` primary key for `Network` (spec §3).

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::{Deserialize, Serialize};
use std::{fmt, net::IpAddr, str::FromStr};

use crate::error::{MasonError, Result};
use crate::model::addr::Addr;

/// Addr + mask length, normalized to network base (host bits cleared).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Prefix(IpNet);

impl Prefix {
    /// Builds a normalized prefix from a base address and mask length
    pub fn new(base: Addr, mask_len: u8) -> Result<Self> {
        let net = match base.ip() {
            IpAddr::V4(v4) => IpNet::V4(
                Ipv4Net::new(v4, mask_len)
                    .map_err(|e| {
                        MasonError::from_ipnet_parse_error(&base.to_string(), e)
                    })?
                    .trunc(),
            ),
            IpAddr::V6(v6) => IpNet::V6(
                Ipv6Net::new(v6, mask_len)
                    .map_err(|e| {
                        MasonError::from_ipnet_parse_error(&base.to_string(), e)
                    })?
                    .trunc(),
            ),
        };
        Ok(Self(net))
    }

    /// Returns the normalized network base address
    pub fn network(&self) -> Addr {
        Addr::new(self.0.network())
    }

    /// Returns the mask (prefix) length
    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Returns true if this is an IPv6 prefix
    pub fn is_ipv6(&self) -> bool {
        matches!(self.0, IpNet::V6(_))
    }

    /// Returns the underlying `ipnet` representation
    pub fn as_ipnet(&self) -> IpNet {
        self.0
    }

    /// Number of addressable hosts in this prefix, inclusive of the network
    /// and broadcast address (spec §4.4: "the source makes no attempt to
    /// exclude them").
    pub fn address_count(&self) -> u128 {
        let host_bits = match self.0 {
            IpNet::V4(_) => 32u32 - self.prefix_len() as u32,
            IpNet::V6(_) => 128u32 - self.prefix_len() as u32,
        };
        1u128 << host_bits
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Prefix {
    type Err = MasonError;

    fn from_str(s: &str) -> Result<Self> {
        let net = IpNet::from_str(s)
            .map_err(|e| MasonError::from_ipnet_parse_error(s, e))?;
        Ok(Self(match net {
            IpNet::V4(n) => IpNet::V4(n.trunc()),
            IpNet::V6(n) => IpNet::V6(n.trunc()),
        }))
    }
}

impl TryFrom<String> for Prefix {
    type Error = MasonError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_str(&value)
    }
}

impl From<Prefix> for String {
    fn from(value: Prefix) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
#[path = "./prefix_tests.rs"]
mod tests;
