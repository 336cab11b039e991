//! Device data model and the monotonic merge algorithm (spec §3, §4.9)
//!
//! Grounded on the teacher's `Device`/`DeviceWithPorts` (`scanners.rs`) and
//! their `impl From<DeviceWithPorts> for Device` narrowing conversion,
//! generalized into full sub-records and a field-by-field merge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::model::{addr::Addr, mac::Mac, port_list::PortList, tags::Tags, timestamp::Timestamp};

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

/// How a device was first discovered (spec §3: `DiscoveredBy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoverySource {
    /// Found via an ARP reply
    Arp,
    /// Found via an ICMP echo reply
    Ping,
    /// Found via a direct SNMP probe
    Snmp,
    /// Found as an entry in another device's SNMP ARP table
    SnmpArp,
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Arp => "ARP",
            Self::Ping => "PING",
            Self::Snmp => "SNMP",
            Self::SnmpArp => "SNMP_ARP",
        };
        write!(f, "{}", s)
    }
}

/// Identity sub-record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Display name, empty until enrichment or SNMP resolves one.
    pub name: String,
    /// The device's IP address, its store key.
    pub addr: Addr,
    /// MAC address, if one was seen (ARP/ICMP discovery; absent for
    /// SNMP-only discovery until an ARP reply arrives).
    pub mac: Mac,
    /// When this device was first discovered.
    pub discovered_at: Timestamp,
    /// Which probe first discovered this device.
    pub discovered_by: DiscoverySource,
}

/// Meta sub-record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceMeta {
    pub dns_name: String,
    pub manufacturer: String,
    pub tags: Tags,
}

/// Server sub-record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceServer {
    pub ports: PortList,
    pub last_scan: Timestamp,
}

/// Performance-ping sub-record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformancePing {
    pub first_seen: Timestamp,
    pub last_seen: Timestamp,
    #[serde(with = "duration_millis")]
    pub mean: Duration,
    #[serde(with = "duration_millis")]
    pub maximum: Duration,
    pub last_failed: bool,
}

impl Default for PerformancePing {
    fn default() -> Self {
        Self {
            first_seen: Timestamp::ZERO,
            last_seen: Timestamp::ZERO,
            mean: Duration::ZERO,
            maximum: Duration::ZERO,
            last_failed: false,
        }
    }
}

/// SNMP sub-record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceSnmp {
    pub name: String,
    pub description: String,
    pub community: String,
    pub port: u16,
    /// Whether the most recent direct SNMP identity check succeeded
    pub last_snmp_check: bool,
    pub has_arp_table: bool,
    pub last_arp_table_scan: Timestamp,
    pub has_interfaces: bool,
    pub last_interfaces_scan: Timestamp,
}

/// A device on the network (spec §3). Keyed by `Addr`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub identity: DeviceIdentity,
    pub meta: DeviceMeta,
    pub server: DeviceServer,
    pub performance_ping: PerformancePing,
    pub snmp: DeviceSnmp,
    /// Transient flag signalling a merge occurred. Never persisted
    /// meaningfully across process restarts; reset by the caller after
    /// being read.
    #[serde(skip)]
    pub updated: bool,
}

impl Device {
    /// Constructs a freshly-discovered device
    pub fn new(
        addr: Addr,
        mac: Mac,
        discovered_by: DiscoverySource,
        discovered_at: Timestamp,
    ) -> Self {
        Self {
            identity: DeviceIdentity {
                name: addr.to_string(),
                addr,
                mac,
                discovered_at,
                discovered_by,
            },
            meta: DeviceMeta::default(),
            server: DeviceServer::default(),
            performance_ping: PerformancePing::default(),
            snmp: DeviceSnmp::default(),
            updated: false,
        }
    }

    /// IsServer ≡ Ports non-empty (spec §3)
    pub fn is_server(&self) -> bool {
        !self.server.ports.is_empty()
    }

    fn promote_dns_name_to_name(&mut self) -> bool {
        let name_is_placeholder =
            self.identity.name.is_empty() || self.identity.name == self.identity.addr.to_string();
        if name_is_placeholder && !self.meta.dns_name.is_empty() {
            if self.identity.name != self.meta.dns_name {
                self.identity.name = self.meta.dns_name.clone();
                return true;
            }
        }
        false
    }

    /// Merges `incoming` into `self` following the monotonic "present beats
    /// absent, never the inverse" rule of spec §4.9. Returns true if any
    /// field changed.
    ///
    /// `DiscoveredBy` resolves the open question in spec §9: rather than
    /// the inconsistent "current empty and differs" guard the spec flags as
    /// a likely bug, this implementation adopts "present beats absent"
    /// uniformly, i.e. any differing incoming source wins.
    pub fn merge(&mut self, incoming: &Device) -> bool {
        let mut changed = false;

        macro_rules! replace_str_if_present {
            ($field:expr, $incoming:expr) => {
                if !$incoming.is_empty() && $field != $incoming {
                    $field = $incoming.to_string();
                    changed = true;
                }
            };
        }

        let incoming_name_is_placeholder = incoming.identity.name.is_empty()
            || incoming.identity.name == incoming.identity.addr.to_string();
        if !incoming_name_is_placeholder && self.identity.name != incoming.identity.name {
            self.identity.name = incoming.identity.name.clone();
            changed = true;
        }

        if incoming.identity.discovered_by != self.identity.discovered_by {
            self.identity.discovered_by = incoming.identity.discovered_by;
            changed = true;
        }

        if incoming.identity.discovered_at != Timestamp::ZERO
            && incoming.identity.discovered_at != self.identity.discovered_at
        {
            self.identity.discovered_at = incoming.identity.discovered_at;
            changed = true;
        }

        if !incoming.identity.mac.is_empty() && incoming.identity.mac != self.identity.mac {
            self.identity.mac = incoming.identity.mac;
            changed = true;
        }

        replace_str_if_present!(self.meta.dns_name, incoming.meta.dns_name.as_str());
        replace_str_if_present!(
            self.meta.manufacturer,
            incoming.meta.manufacturer.as_str()
        );

        if self.meta.tags.is_empty() && !incoming.meta.tags.is_empty() {
            self.meta.tags = incoming.meta.tags.clone();
            changed = true;
        }

        if self.server.ports.is_empty() && !incoming.server.ports.is_empty() {
            self.server.ports = incoming.server.ports.clone();
            changed = true;
        }

        if !incoming.server.last_scan.is_zero()
            && incoming.server.last_scan != self.server.last_scan
        {
            self.server.last_scan = incoming.server.last_scan;
            changed = true;
        }

        // FirstSeen never regresses: non-zero incoming wins only when we
        // don't already have one.
        if self.performance_ping.first_seen.is_zero()
            && !incoming.performance_ping.first_seen.is_zero()
        {
            self.performance_ping.first_seen = incoming.performance_ping.first_seen;
            changed = true;
        }

        if !incoming.performance_ping.last_seen.is_zero()
            && incoming.performance_ping.last_seen != self.performance_ping.last_seen
        {
            self.performance_ping.last_seen = incoming.performance_ping.last_seen;
            changed = true;
        }

        if incoming.performance_ping.mean != self.performance_ping.mean {
            self.performance_ping.mean = incoming.performance_ping.mean;
            changed = true;
        }

        if incoming.performance_ping.maximum != self.performance_ping.maximum {
            self.performance_ping.maximum = incoming.performance_ping.maximum;
            changed = true;
        }

        if incoming.performance_ping.last_failed != self.performance_ping.last_failed {
            self.performance_ping.last_failed = incoming.performance_ping.last_failed;
            changed = true;
        }

        replace_str_if_present!(self.snmp.name, incoming.snmp.name.as_str());
        replace_str_if_present!(
            self.snmp.description,
            incoming.snmp.description.as_str()
        );
        replace_str_if_present!(self.snmp.community, incoming.snmp.community.as_str());

        if incoming.snmp.port != 0 && incoming.snmp.port != self.snmp.port {
            self.snmp.port = incoming.snmp.port;
            changed = true;
        }

        if incoming.snmp.last_snmp_check != self.snmp.last_snmp_check {
            self.snmp.last_snmp_check = incoming.snmp.last_snmp_check;
            changed = true;
        }

        if !self.snmp.has_arp_table && incoming.snmp.has_arp_table {
            self.snmp.has_arp_table = true;
            changed = true;
        }

        if !incoming.snmp.last_arp_table_scan.is_zero()
            && incoming.snmp.last_arp_table_scan != self.snmp.last_arp_table_scan
        {
            self.snmp.last_arp_table_scan = incoming.snmp.last_arp_table_scan;
            changed = true;
        }

        if !self.snmp.has_interfaces && incoming.snmp.has_interfaces {
            self.snmp.has_interfaces = true;
            changed = true;
        }

        if !incoming.snmp.last_interfaces_scan.is_zero()
            && incoming.snmp.last_interfaces_scan != self.snmp.last_interfaces_scan
        {
            self.snmp.last_interfaces_scan = incoming.snmp.last_interfaces_scan;
            changed = true;
        }

        if self.promote_dns_name_to_name() {
            changed = true;
        }

        self.updated = self.updated || changed;
        changed
    }

    /// Updates `PerformancePing` from a completed ping round (spec §4.6).
    pub fn update_from_ping_stats(
        &mut self,
        success_count: u32,
        mean: Duration,
        maximum: Duration,
        now: Timestamp,
    ) {
        if success_count > 0 {
            self.performance_ping.last_failed = false;
            self.performance_ping.last_seen = now;
            self.performance_ping.mean = mean;
            self.performance_ping.maximum = maximum;
            if self.performance_ping.first_seen.is_zero() {
                self.performance_ping.first_seen = now;
            }
        } else {
            self.performance_ping.last_failed = true;
        }
    }
}

#[cfg(test)]
#[path = "./device_tests.rs"]
mod tests;
