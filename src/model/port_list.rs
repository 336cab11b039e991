//! Ordered set of TCP ports
//!
//! Grounded on the teacher's `scanners::Port`/`PortSet` (a `HashSet<Port>`
//! with an attached service name); the spec's `PortList` drops the
//! service-name annotation and requires a stable space-separated decimal
//! serialization (spec §3), so this is a plain ordered `u16` set instead.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};

use crate::error::{MasonError, Result};

/// Ordered set of TCP port numbers; serialized as space-separated decimals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortList(BTreeSet<u16>);

impl PortList {
    /// An empty port list
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Builds a port list from an iterator of ports
    pub fn from_ports(ports: impl IntoIterator<Item = u16>) -> Self {
        Self(ports.into_iter().collect())
    }

    /// Inserts a port, returning true if it was newly inserted
    pub fn insert(&mut self, port: u16) -> bool {
        self.0.insert(port)
    }

    /// Returns true if the list has no ports
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of ports in the list
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the ports in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &u16> {
        self.0.iter()
    }
}

impl fmt::Display for PortList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{}", rendered)
    }
}

impl FromStr for PortList {
    type Err = MasonError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::new());
        }
        let mut ports = BTreeSet::new();
        for part in trimmed.split_whitespace() {
            let port: u16 = part.parse().map_err(|e| {
                MasonError::from_port_parse_int_err(part, e)
            })?;
            ports.insert(port);
        }
        Ok(Self(ports))
    }
}

impl TryFrom<String> for PortList {
    type Error = MasonError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_str(&value)
    }
}

impl From<PortList> for String {
    fn from(value: PortList) -> Self {
        value.to_string()
    }
}

impl FromIterator<u16> for PortList {
    fn from_iter<T: IntoIterator<Item = u16>>(iter: T) -> Self {
        Self::from_ports(iter)
    }
}

#[cfg(test)]
#[path = "./port_list_tests.rs"]
mod tests;
