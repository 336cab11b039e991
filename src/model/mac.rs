//! 48-bit hardware address
//!
//! Grounded on the teacher's `pnet::util::MacAddr` usage in `scanners.rs`,
//! which serializes via custom `serialize_to_string`/`deserialize_from_str`
//! helpers; this wrapper keeps that string-serialization idiom but adds the
//! empty-vs-broadcast distinction required by spec §3.

use pnet::util::MacAddr as PnetMacAddr;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{MasonError, Result};

/// 48-bit hardware address. Empty (zero-length) is distinguished from
/// broadcast (`ff:ff:ff:ff:ff:ff`); an empty MAC is never stored for a
/// device (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mac {
    /// No hardware address is known
    Empty,
    /// A known 48-bit address
    Known(PnetMacAddr),
}

impl Mac {
    /// The broadcast address `ff:ff:ff:ff:ff:ff`
    pub fn broadcast() -> Self {
        Self::Known(PnetMacAddr::broadcast())
    }

    /// Returns true for the zero-length "empty" MAC
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns true for the broadcast address
    pub fn is_broadcast(&self) -> bool {
        matches!(self, Self::Known(m) if *m == PnetMacAddr::broadcast())
    }

    /// Returns the inner pnet MacAddr, if known
    pub fn as_pnet(&self) -> Option<PnetMacAddr> {
        match self {
            Self::Empty => None,
            Self::Known(m) => Some(*m),
        }
    }
}

impl Default for Mac {
    fn default() -> Self {
        Self::Empty
    }
}

impl From<PnetMacAddr> for Mac {
    fn from(value: PnetMacAddr) -> Self {
        if value == PnetMacAddr::zero() {
            Self::Empty
        } else {
            Self::Known(value)
        }
    }
}

impl fmt::Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, ""),
            Self::Known(m) => write!(f, "{}", m),
        }
    }
}

impl FromStr for Mac {
    type Err = MasonError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::Empty);
        }
        let mac = PnetMacAddr::from_str(s).map_err(|e| MasonError::Scan {
            error: e.to_string(),
            addr: Some(s.to_string()),
            port: None,
        })?;
        Ok(Self::from(mac))
    }
}

impl TryFrom<String> for Mac {
    type Error = MasonError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_str(&value)
    }
}

impl From<Mac> for String {
    fn from(value: Mac) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
#[path = "./mac_tests.rs"]
mod tests;
