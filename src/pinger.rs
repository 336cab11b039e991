//! Performance pinger: periodic ICMP round trips against known devices,
//! feeding `Device.PerformancePing` and the timeseries store (spec §4.6).
//!
//! Grounded on `scanners/heartbeat.rs`'s `HeartBeat` (send N probes, collect
//! statistics) and `probes::icmp::IcmpProbe`'s statistics record, which this
//! module invokes directly rather than re-deriving RTTs itself.

use derive_builder::Builder;
use std::time::{Duration, Instant};

use crate::{
    error::{MasonError, Result},
    model::{device::Device, timestamp::Timestamp},
    probes::icmp::{IcmpProbe, IcmpStats},
};

/// Selects devices due for a performance ping: never pinged successfully,
/// or (is a server and older than `server_interval_secs`) or (not a server
/// and older than `default_interval_secs`). A device that keeps failing
/// never advances `LastSeen`, so it remains selected every cycle until it
/// answers (spec §4.6).
pub fn performance_pinger_filter(
    device: &Device,
    now: Timestamp,
    default_interval_secs: u64,
    server_interval_secs: u64,
) -> bool {
    let interval = if device.is_server() {
        server_interval_secs
    } else {
        default_interval_secs
    };
    device.performance_ping.last_seen.is_stale(now, interval)
}

/// Configuration for one ping round, shared across every selected device.
#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct PingerConfig {
    #[builder(default = "false")]
    pub privileged: bool,
    #[builder(default = "1")]
    pub ping_count: u32,
    #[builder(default = "Duration::from_secs(2)")]
    pub timeout: Duration,
}

impl PingerConfig {
    /// Returns a builder for PingerConfig
    pub fn builder() -> PingerConfigBuilder {
        PingerConfigBuilder::default()
    }
}

/// The outcome of one ping round against one device: the post-update
/// device, wall-clock start, elapsed duration, and raw statistics --
/// exactly what the orchestrator needs to both publish a result event and
/// write a timeseries `Point` (spec §4.6).
#[derive(Debug, Clone)]
pub struct PingResult {
    pub start: Timestamp,
    pub device: Device,
    pub duration: Duration,
    pub stats: IcmpStats,
}

/// Pings `device` per `config`, returning its post-`UpdateFromPingStats`
/// clone alongside the raw statistics. Never fails solely because the
/// device didn't answer -- `stats.success_count == 0` and
/// `device.performance_ping.last_failed` communicate that.
pub fn ping(device: &Device, config: &PingerConfig) -> Result<PingResult> {
    let target = device.identity.addr.as_v4().ok_or_else(|| {
        MasonError::Ipv6ExcludedFromDiscovery(device.identity.addr.to_string())
    })?;

    let probe = IcmpProbe::builder()
        .target(target)
        .privileged(config.privileged)
        .count(config.ping_count)
        .timeout(config.timeout)
        .build()
        .map_err(|e| MasonError::Wire(e.to_string()))?;

    let start = Timestamp::now();
    let round_start = Instant::now();
    let stats = probe.probe()?;
    let duration = round_start.elapsed();

    let mut updated = device.clone();
    updated.update_from_ping_stats(stats.success_count, stats.mean, stats.maximum, start);

    Ok(PingResult {
        start,
        device: updated,
        duration,
        stats,
    })
}

#[cfg(test)]
#[path = "./pinger_tests.rs"]
mod tests;
