//! Per-address scan pipeline: ARP, then ICMP, then SNMP (spec §4.4).
//!
//! Grounded on `scanners/full_scanner.rs`'s `ARPScanner` -> `SYNScanner`
//! chaining (scan one stage, fall through to the next on no-answer), but
//! collapsed into a single in-process ordered short-circuit over the three
//! probe primitives rather than two independent packet-capture scanners.

use ipnet::Contains;
use log::debug;
use std::net::IpAddr;
use std::time::Duration;

use crate::{
    bus::Event,
    error::{MasonError, Result},
    model::{addr::Addr, device::DiscoverySource, timestamp::Timestamp},
    network::Interface,
    probes::{arp::ArpProbe, icmp::IcmpProbe, snmp::SnmpProbe},
};

/// ARP stage configuration.
#[derive(Debug, Clone)]
pub struct ArpStage {
    /// How long to wait for a reply before moving to the next stage.
    pub timeout: Duration,
}

/// ICMP stage configuration.
#[derive(Debug, Clone)]
pub struct IcmpStage {
    /// Whether to use a privileged (raw socket) ping.
    pub privileged: bool,
    /// Number of echoes to send.
    pub count: u32,
    /// How long to wait for replies before moving to the next stage.
    pub timeout: Duration,
}

/// SNMP stage configuration.
#[derive(Debug, Clone)]
pub struct SnmpStage {
    /// Community string to try.
    pub community: String,
    /// UDP port to query.
    pub port: u16,
    /// How long to wait for a reply.
    pub timeout: Duration,
}

/// Which probe stages are enabled, and in what order to try them (always
/// ARP, then ICMP, then SNMP, per spec §4.4).
#[derive(Debug, Clone, Default)]
pub struct AddressScannerConfig {
    /// ARP stage, if enabled.
    pub arp: Option<ArpStage>,
    /// ICMP stage, if enabled.
    pub icmp: Option<IcmpStage>,
    /// SNMP stage, if enabled.
    pub snmp: Option<SnmpStage>,
}

/// Returns true when `error` means "no device answered", as opposed to a
/// genuine transport/system failure that should propagate.
fn is_no_device(error: &MasonError) -> bool {
    matches!(
        error,
        MasonError::NoResponseFromRemote(_)
            | MasonError::ConnectionRefused(_)
            | MasonError::EmptyResponse(_)
    )
}

/// Runs the configured probe chain against a single address.
pub struct AddressScanner {
    config: AddressScannerConfig,
    interfaces: Vec<Interface>,
}

impl AddressScanner {
    /// Builds a scanner using every currently-usable local interface for
    /// its ARP stage.
    pub fn new(config: AddressScannerConfig) -> Self {
        Self {
            config,
            interfaces: crate::network::usable_interfaces(),
        }
    }

    /// Builds a scanner against an explicit interface set, for tests or a
    /// caller that already enumerated them.
    pub fn with_interfaces(config: AddressScannerConfig, interfaces: Vec<Interface>) -> Self {
        Self { config, interfaces }
    }

    /// Invokes each enabled probe stage in order against `addr`, returning
    /// on the first success. Emits `NoDeviceDiscovered` if every stage
    /// reports no device; propagates any other error untouched.
    pub fn scan(&self, addr: Addr) -> Result<Event> {
        let now = Timestamp::now();
        let Some(v4) = addr.as_v4() else {
            // ARP/ICMP4/SNMP here are all IPv4-only primitives; an IPv6
            // target simply has nothing to answer with (spec §1 Non-goals).
            return Ok(Event::NoDeviceDiscovered { addr });
        };

        if let Some(stage) = &self.config.arp {
            match self.scan_arp(v4, stage) {
                Ok(Some((mac, discovered_at))) => {
                    return Ok(Event::DeviceDiscovered {
                        addr,
                        mac: Some(mac),
                        discovered_by: DiscoverySource::Arp,
                        discovered_at,
                        snmp: None,
                    });
                }
                Ok(None) => {}
                Err(e) => return Err(e),
            }
        }

        if let Some(stage) = &self.config.icmp {
            let probe = IcmpProbe::builder()
                .target(v4)
                .privileged(stage.privileged)
                .count(stage.count)
                .timeout(stage.timeout)
                .build()
                .map_err(|e| MasonError::Wire(e.to_string()))?;

            match probe.probe() {
                Ok(stats) if stats.success_count > 0 => {
                    return Ok(Event::DeviceDiscovered {
                        addr,
                        mac: None,
                        discovered_by: DiscoverySource::Ping,
                        discovered_at: now,
                        snmp: None,
                    });
                }
                Ok(_) => {}
                Err(e) if is_no_device(&e) => {}
                Err(e) => return Err(e),
            }
        }

        if let Some(stage) = &self.config.snmp {
            let probe = SnmpProbe::builder()
                .target(v4)
                .port(stage.port)
                .community(stage.community.clone())
                .timeout(stage.timeout)
                .build()
                .map_err(|e| MasonError::Wire(e.to_string()))?;

            match probe.get_system_info() {
                Ok(info) => {
                    return Ok(Event::DeviceDiscovered {
                        addr,
                        mac: None,
                        discovered_by: DiscoverySource::Snmp,
                        discovered_at: now,
                        snmp: Some(info),
                    });
                }
                Err(e) if is_no_device(&e) => {}
                Err(e) => return Err(e),
            }
        }

        debug!("no device discovered at {}", addr);
        Ok(Event::NoDeviceDiscovered { addr })
    }

    fn scan_arp(
        &self,
        target: std::net::Ipv4Addr,
        stage: &ArpStage,
    ) -> Result<Option<(crate::model::mac::Mac, Timestamp)>> {
        for interface in self
            .interfaces
            .iter()
            .filter(|i| i.prefix.as_ipnet().contains(IpAddr::V4(target)))
        {
            let probe = ArpProbe::builder()
                .interface(interface)
                .timeout(stage.timeout)
                .build()?;

            match probe.probe(target) {
                Ok((_, mac)) => return Ok(Some((mac, Timestamp::now()))),
                Err(e) if is_no_device(&e) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "./scanner_tests.rs"]
mod tests;
