//! Process configuration (spec §6 "Configuration").
//!
//! Grounded on `term/src/config.rs`'s `ConfigManager`: `derive_builder`
//! construction, `serde_yaml` persistence, warn-and-default on a
//! malformed file rather than failing startup.

use derive_builder::Builder;
use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::{
    bus::priority,
    error::{MasonError, Result},
    model::port_list::PortList,
};

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.as_secs().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

/// ARP probe options within discovery (spec §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArpConfig {
    pub enabled: bool,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for ArpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: Duration::from_secs(2),
        }
    }
}

/// ICMP probe options within discovery (spec §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcmpConfig {
    pub enabled: bool,
    pub privileged: bool,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub ping_count: u32,
    pub sleep_between_ms: u64,
}

impl Default for IcmpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            privileged: false,
            timeout: Duration::from_secs(2),
            ping_count: 1,
            sleep_between_ms: 0,
        }
    }
}

/// SNMP probe options within discovery (spec §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnmpDiscoveryConfig {
    pub enabled: bool,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub community: Vec<String>,
    pub ports: Vec<u16>,
    #[serde(with = "duration_secs")]
    pub arp_table_rescan_interval: Duration,
    #[serde(with = "duration_secs")]
    pub interface_rescan_interval: Duration,
}

impl Default for SnmpDiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: Duration::from_secs(2),
            community: vec!["public".to_string()],
            ports: vec![161],
            arp_table_rescan_interval: Duration::from_secs(3600),
            interface_rescan_interval: Duration::from_secs(3600),
        }
    }
}

/// Discovery sweep configuration (spec §6 "discovery").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub enabled: bool,
    pub bootstrap_on_first_run: bool,
    pub auto_discover_new_networks: bool,
    #[serde(with = "duration_secs")]
    pub check_interval: Duration,
    #[serde(with = "duration_secs")]
    pub network_scan_interval: Duration,
    pub max_workers: usize,
    pub max_network_scanners: usize,
    pub arp: ArpConfig,
    pub icmp: IcmpConfig,
    pub snmp: SnmpDiscoveryConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bootstrap_on_first_run: true,
            auto_discover_new_networks: true,
            check_interval: Duration::from_secs(300),
            network_scan_interval: Duration::from_secs(3600),
            max_workers: 10,
            // a shared mutable "current scan" status string is safe only
            // under a single concurrent network scanner (spec §5).
            max_network_scanners: 1,
            arp: ArpConfig::default(),
            icmp: IcmpConfig::default(),
            snmp: SnmpDiscoveryConfig::default(),
        }
    }
}

/// TCP port-scan enrichment options (spec §6 "enrichment.portscan").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortScanConfig {
    pub enabled: bool,
    #[serde(with = "duration_secs")]
    pub port_timeout: Duration,
    pub max_workers: usize,
    #[serde(with = "duration_secs")]
    pub default_interval: Duration,
    #[serde(with = "duration_secs")]
    pub server_interval: Duration,
    pub port_list: PortList,
}

impl Default for PortScanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port_timeout: Duration::from_millis(500),
            max_workers: 10,
            default_interval: Duration::from_secs(3600),
            server_interval: Duration::from_secs(300),
            port_list: PortList::from_ports([22, 80, 443, 2000, 8080, 8443, 27017]),
        }
    }
}

/// SNMP enrichment options (spec §6 "enrichment.snmp").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnmpEnrichConfig {
    pub enabled: bool,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub community: Vec<String>,
    pub ports: Vec<u16>,
}

impl Default for SnmpEnrichConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: Duration::from_secs(2),
            community: vec!["public".to_string()],
            ports: vec![161],
        }
    }
}

/// Enrichment configuration (spec §6 "enrichment").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub max_workers: usize,
    pub dns_enabled: bool,
    pub oui_enabled: bool,
    pub portscan: PortScanConfig,
    pub snmp: SnmpEnrichConfig,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_workers: 10,
            dns_enabled: true,
            oui_enabled: true,
            portscan: PortScanConfig::default(),
            snmp: SnmpEnrichConfig::default(),
        }
    }
}

/// Performance-ping configuration (spec §6 "pinger").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingerSettings {
    pub enabled: bool,
    pub privileged: bool,
    pub max_workers: usize,
    pub ping_count: u32,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    #[serde(with = "duration_secs")]
    pub check_interval: Duration,
    #[serde(with = "duration_secs")]
    pub default_interval: Duration,
    #[serde(with = "duration_secs")]
    pub server_interval: Duration,
}

impl Default for PingerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            privileged: false,
            max_workers: 10,
            ping_count: 3,
            timeout: Duration::from_secs(2),
            check_interval: Duration::from_secs(60),
            default_interval: Duration::from_secs(300),
            server_interval: Duration::from_secs(60),
        }
    }
}

/// IPFIX listener configuration (spec §6 "netflows").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetflowConfig {
    pub enabled: bool,
    pub listen_address: SocketAddr,
    pub max_workers: usize,
    pub packet_size: usize,
}

impl Default for NetflowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_address: "0.0.0.0:2055".parse().expect("valid default listen address"),
            max_workers: 4,
            packet_size: 1500,
        }
    }
}

/// Event bus configuration (spec §6 "bus").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    pub max_events: usize,
    pub max_errors: usize,
    pub inbound_size: usize,
    pub minimum_priority_level: u8,
    pub enable_debug_log: bool,
    pub enable_error_log: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_events: 1000,
            max_errors: 100,
            inbound_size: 256,
            minimum_priority_level: priority::DISCOVERED,
            enable_debug_log: false,
            enable_error_log: true,
        }
    }
}

/// Root configuration document (spec §6).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasonConfig {
    pub discovery: DiscoveryConfig,
    pub enrichment: EnrichmentConfig,
    pub pinger: PingerSettings,
    pub netflows: NetflowConfig,
    pub bus: BusConfig,
}

/// Returns the default per-user config file path, creating its parent
/// directory if necessary.
pub fn default_config_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "mason")
        .ok_or_else(|| MasonError::Wire("failed to determine project directory".into()))?;
    let config_dir = project_dirs.config_dir();
    std::fs::create_dir_all(config_dir).map_err(|e| MasonError::Wire(e.to_string()))?;
    Ok(config_dir.join("config.yml"))
}

/// Loads, persists, and hands out the current [`MasonConfig`].
#[derive(Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct ConfigManager {
    /// Path to the on-disk YAML config
    path: PathBuf,
    #[builder(setter(skip))]
    config: MasonConfig,
}

impl ConfigManagerBuilder {
    /// Builds the manager, loading `path` if it exists (falling back to
    /// defaults and logging a warning on a parse failure) or writing a
    /// fresh default file if it doesn't.
    pub fn build(&self) -> Result<ConfigManager> {
        let mut manager = self
            ._build()
            .map_err(|e| MasonError::Wire(e.to_string()))?;

        match std::fs::File::open(&manager.path) {
            Ok(file) => {
                manager.config = serde_yaml::from_reader(file).unwrap_or_else(|e| {
                    warn!(
                        "failed to parse config file at {:?}, using defaults: {e}",
                        manager.path
                    );
                    MasonConfig::default()
                });
            }
            Err(_) => {
                manager.config = MasonConfig::default();
                manager.write()?;
            }
        }

        Ok(manager)
    }
}

impl ConfigManager {
    /// Returns a new instance of ConfigManagerBuilder
    pub fn builder() -> ConfigManagerBuilder {
        ConfigManagerBuilder::default()
    }

    /// The currently loaded configuration
    pub fn config(&self) -> &MasonConfig {
        &self.config
    }

    /// Replaces and persists the configuration
    pub fn update(&mut self, config: MasonConfig) -> Result<()> {
        self.config = config;
        self.write()
    }

    fn write(&self) -> Result<()> {
        let serialized =
            serde_yaml::to_string(&self.config).map_err(|e| MasonError::Wire(e.to_string()))?;
        std::fs::write(&self.path, serialized).map_err(|e| MasonError::Wire(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "./config_tests.rs"]
mod tests;
