//! Network (subnet) data model (spec §3)

use serde::{Deserialize, Serialize};

use crate::model::{prefix::Prefix, tags::Tags, timestamp::Timestamp};

/// A discovered or configured subnet. Primary key = `Prefix` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub prefix: Prefix,
    pub last_scan: Timestamp,
    pub tags: Tags,
}

impl Network {
    /// Builds a freshly-discovered network with no name or scan history
    pub fn new(prefix: Prefix) -> Self {
        Self {
            name: prefix.to_string(),
            prefix,
            last_scan: Timestamp::ZERO,
            tags: Tags::new(),
        }
    }

    /// Primary-key string, matching `Prefix`'s canonical string form
    pub fn key(&self) -> String {
        self.prefix.to_string()
    }
}

#[cfg(test)]
#[path = "./network_tests.rs"]
mod tests;
