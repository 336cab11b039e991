//! In-process reference implementations of the store contracts (spec §6).
//!
//! Grounded on `term/src/store/state.rs`'s `State`: a keyed in-memory
//! collection guarded by a single mutex, swapped wholesale by tests via a
//! constructor override. Generalized here into one struct per trait so the
//! orchestrator can hold `Arc<dyn Trait>` and swap in a persistent backend
//! later without touching call sites.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{
    error::Result,
    model::{addr::Addr, asn::Asn, device::Device, flow::IpFlow, network::Network, timestamp::Timestamp},
    probes::icmp::IcmpStats,
    store::traits::{
        AsnLoadTransaction, AsnStore, DeviceStore, FlowSummary, NetflowStore, NetworkStore, Point,
        TimeseriesStore,
    },
};

use crate::error::MasonError;

/// In-process [`NetworkStore`], keyed by `Network::key()`.
#[derive(Debug, Default)]
pub struct MemoryNetworkStore {
    networks: Mutex<HashMap<String, Network>>,
}

impl MemoryNetworkStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NetworkStore for MemoryNetworkStore {
    fn add(&self, network: Network) -> Result<()> {
        let mut networks = self.networks.lock()?;
        if networks.contains_key(&network.key()) {
            return Err(MasonError::NetworkExists(network.key()));
        }
        networks.insert(network.key(), network);
        Ok(())
    }

    fn remove_by_name(&self, name: &str) -> Result<()> {
        self.networks.lock()?.retain(|_, n| n.name != name);
        Ok(())
    }

    fn update(&self, network: Network) -> Result<()> {
        self.networks.lock()?.insert(network.key(), network);
        Ok(())
    }

    fn upsert(&self, network: Network) -> Result<()> {
        self.networks.lock()?.insert(network.key(), network);
        Ok(())
    }

    fn get_by_name(&self, name: &str) -> Result<Option<Network>> {
        Ok(self
            .networks
            .lock()?
            .values()
            .find(|n| n.name == name)
            .cloned())
    }

    fn list_filtered(&self, predicate: &dyn Fn(&Network) -> bool) -> Result<Vec<Network>> {
        Ok(self
            .networks
            .lock()?
            .values()
            .filter(|n| predicate(n))
            .cloned()
            .collect())
    }

    fn list(&self) -> Result<Vec<Network>> {
        Ok(self.networks.lock()?.values().cloned().collect())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.networks.lock()?.len())
    }
}

/// In-process [`DeviceStore`], keyed by `Addr`.
#[derive(Debug, Default)]
pub struct MemoryDeviceStore {
    devices: Mutex<HashMap<Addr, Device>>,
}

impl MemoryDeviceStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceStore for MemoryDeviceStore {
    fn add(&self, device: Device) -> Result<()> {
        let mut devices = self.devices.lock()?;
        if devices.contains_key(&device.identity.addr) {
            return Err(MasonError::DeviceExists(device.identity.addr.to_string()));
        }
        devices.insert(device.identity.addr, device);
        Ok(())
    }

    fn remove_by_addr(&self, addr: Addr) -> Result<()> {
        self.devices.lock()?.remove(&addr);
        Ok(())
    }

    fn update(&self, incoming: Device) -> Result<bool> {
        let mut devices = self.devices.lock()?;
        match devices.get_mut(&incoming.identity.addr) {
            Some(existing) => {
                let mac_was_unknown = existing.identity.mac.is_empty();
                existing.merge(&incoming);
                let enrich_requested = mac_was_unknown && !existing.identity.mac.is_empty();
                Ok(enrich_requested)
            }
            None => {
                let enrich_requested = !incoming.identity.mac.is_empty();
                devices.insert(incoming.identity.addr, incoming);
                Ok(enrich_requested)
            }
        }
    }

    fn get_by_addr(&self, addr: Addr) -> Result<Option<Device>> {
        Ok(self.devices.lock()?.get(&addr).cloned())
    }

    fn list_filtered(&self, predicate: &dyn Fn(&Device) -> bool) -> Result<Vec<Device>> {
        Ok(self
            .devices
            .lock()?
            .values()
            .filter(|d| predicate(d))
            .cloned()
            .collect())
    }

    fn list(&self) -> Result<Vec<Device>> {
        Ok(self.devices.lock()?.values().cloned().collect())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.devices.lock()?.len())
    }
}

/// In-process [`TimeseriesStore`], keyed by device address.
#[derive(Debug, Default)]
pub struct MemoryTimeseriesStore {
    points: Mutex<HashMap<Addr, Vec<Point>>>,
}

impl MemoryTimeseriesStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeseriesStore for MemoryTimeseriesStore {
    fn write_performance_ping(&self, ts: Timestamp, device: &Device, stats: &IcmpStats) -> Result<()> {
        let loss = stats.packet_loss;
        let point = Point {
            start: ts,
            min: stats.minimum,
            avg: stats.mean,
            max: stats.maximum,
            loss,
        };
        self.points
            .lock()?
            .entry(device.identity.addr)
            .or_default()
            .push(point);
        Ok(())
    }

    fn read_performance_pings(&self, device: &Device, duration: Duration) -> Result<Vec<Point>> {
        let points = self.points.lock()?;
        let Some(series) = points.get(&device.identity.addr) else {
            return Ok(Vec::new());
        };
        let now = Timestamp::now();
        let cutoff = now.as_secs().saturating_sub(duration.as_secs());
        let mut selected: Vec<Point> = series
            .iter()
            .filter(|p| p.start.as_secs() >= cutoff)
            .copied()
            .collect();
        selected.sort_by_key(|p| p.start.as_secs());
        Ok(selected)
    }
}

/// In-process [`NetflowStore`].
#[derive(Debug, Default)]
pub struct MemoryNetflowStore {
    flows: Mutex<Vec<IpFlow>>,
}

impl MemoryNetflowStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NetflowStore for MemoryNetflowStore {
    fn add_netflows(&self, batch: Vec<IpFlow>) -> Result<()> {
        self.flows.lock()?.extend(batch);
        Ok(())
    }

    fn summary_by_ip(&self) -> Result<Vec<FlowSummary>> {
        let flows = self.flows.lock()?;
        let mut totals: HashMap<String, (u64, u64)> = HashMap::new();
        for flow in flows.iter() {
            let entry = totals.entry(flow.src_addr.to_string()).or_default();
            entry.0 += flow.bytes;
            entry.1 += flow.packets;
        }
        Ok(totals
            .into_iter()
            .map(|(key, (bytes, packets))| FlowSummary { key, bytes, packets })
            .collect())
    }

    fn summary_by_org(&self, asns: &dyn AsnStore) -> Result<Vec<FlowSummary>> {
        let flows = self.flows.lock()?;
        let mut totals: HashMap<String, (u64, u64)> = HashMap::new();
        for flow in flows.iter() {
            let Some(v4) = flow.src_addr.as_v4() else {
                continue;
            };
            let Some(asn) = asns.get_asn(v4)? else {
                continue;
            };
            let entry = totals.entry(asn.name).or_default();
            entry.0 += flow.bytes;
            entry.1 += flow.packets;
        }
        Ok(totals
            .into_iter()
            .map(|(key, (bytes, packets))| FlowSummary { key, bytes, packets })
            .collect())
    }

    fn summary_by_country(&self, asns: &dyn AsnStore) -> Result<Vec<FlowSummary>> {
        let flows = self.flows.lock()?;
        let mut totals: HashMap<String, (u64, u64)> = HashMap::new();
        for flow in flows.iter() {
            let Some(v4) = flow.src_addr.as_v4() else {
                continue;
            };
            let Some(asn) = asns.get_asn(v4)? else {
                continue;
            };
            let entry = totals.entry(asn.country).or_default();
            entry.0 += flow.bytes;
            entry.1 += flow.packets;
        }
        Ok(totals
            .into_iter()
            .map(|(key, (bytes, packets))| FlowSummary { key, bytes, packets })
            .collect())
    }
}

/// In-process [`AsnStore`], with a staged-load area backing
/// [`AsnLoadTransaction`] so readers never see a half-populated catalogue.
#[derive(Debug, Clone, Default)]
pub struct MemoryAsnStore {
    live: Arc<Mutex<Vec<Asn>>>,
    staging: Arc<Mutex<Option<Vec<Asn>>>>,
}

impl MemoryAsnStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

struct MemoryAsnLoadTransaction {
    live: Arc<Mutex<Vec<Asn>>>,
    staging: Arc<Mutex<Option<Vec<Asn>>>>,
}

impl AsnLoadTransaction for MemoryAsnLoadTransaction {
    fn commit(self: Box<Self>) -> Result<()> {
        let staged = self.staging.lock()?.take().unwrap_or_default();
        *self.live.lock()? = staged;
        Ok(())
    }
}

impl AsnStore for MemoryAsnStore {
    fn start_asn_load(&self) -> Result<Box<dyn AsnLoadTransaction>> {
        *self.staging.lock()? = Some(Vec::new());
        Ok(Box::new(MemoryAsnLoadTransaction {
            live: Arc::clone(&self.live),
            staging: Arc::clone(&self.staging),
        }))
    }

    fn upsert_asn(&self, asn: Asn) -> Result<()> {
        let mut staging = self.staging.lock()?;
        if let Some(rows) = staging.as_mut() {
            rows.retain(|a| a.asn != asn.asn);
            rows.push(asn);
        } else {
            drop(staging);
            let mut live = self.live.lock()?;
            live.retain(|a| a.asn != asn.asn);
            live.push(asn);
        }
        Ok(())
    }

    fn get_asn(&self, addr: Ipv4Addr) -> Result<Option<Asn>> {
        Ok(self
            .live
            .lock()?
            .iter()
            .find(|a| a.ip_range.contains(addr))
            .cloned())
    }
}

#[cfg(test)]
#[path = "./memory_tests.rs"]
mod tests;
