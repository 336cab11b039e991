//! Mason: the central run-loop tying pools, the event bus, and the store
//! contracts together (spec §4.7).
//!
//! Grounded on `term/src/events/manager.rs`'s single-channel event loop
//! (`rx.recv()` against one `Event` type) and `term/src/ui/store.rs`'s
//! `Store`/`Dispatcher`/reducer idiom, generalized from UI `Action`s
//! dispatched against one `State` to system `Event`s dispatched against the
//! `NetworkStore`/`DeviceStore` contracts. Unlike the teacher, several
//! concurrent sources feed this loop (five worker pools, four tickers, and
//! -- when `netflows.enabled` -- the IPFIX UDP listener); rather than
//! hand-rolling a multi-channel select (this stack carries no
//! `crossbeam-channel`), each source is folded onto the event bus by a
//! small forwarder thread, so the central loop still only ever blocks on
//! one channel: the bus's own listener receiver.

use log::error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::{
    bus::{Event, EventBus},
    config::{EnrichmentConfig, MasonConfig},
    discovery::{
        bootstrap::bootstrap_networks,
        filters::{network_rescan_filter, snmp_arp_table_rescan_filter, snmp_interface_rescan_filter},
        network_scan,
        scanner::{AddressScanner, AddressScannerConfig, ArpStage, IcmpStage, SnmpStage},
    },
    enrichment::{dns, oui, portscan, snmp_walk},
    error::{MasonError, Result},
    ipfix::{decoder::decode_message, listener, template::TemplateCache},
    model::{
        addr::Addr,
        device::{Device, DiscoverySource},
        flow::IpFlow,
        network::Network,
        timestamp::Timestamp,
    },
    pinger::{self, PingResult, PingerConfig},
    pool::WorkerPool,
    probes::snmp::SnmpProbe,
    store::traits::{DeviceStore, NetflowStore, NetworkStore, TimeseriesStore},
};

/// How often a ticker or the main loop re-checks its cancellation flag.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Central run-loop (spec §4.7). Owns the event bus; `run` blocks until
/// `cancelled` is set, at which point every pool input is closed, every
/// background thread is allowed to drain, and the bus is torn down.
pub struct Orchestrator {
    config: MasonConfig,
    networks: Arc<dyn NetworkStore>,
    devices: Arc<dyn DeviceStore>,
    timeseries: Arc<dyn TimeseriesStore>,
    netflows: Arc<dyn NetflowStore>,
    bus: Arc<EventBus>,
}

impl Orchestrator {
    /// Builds an orchestrator against the given stores, constructing its
    /// own event bus from `config.bus`.
    pub fn new(
        config: MasonConfig,
        networks: Arc<dyn NetworkStore>,
        devices: Arc<dyn DeviceStore>,
        timeseries: Arc<dyn TimeseriesStore>,
        netflows: Arc<dyn NetflowStore>,
    ) -> Self {
        let bus = Arc::new(EventBus::new(
            config.bus.inbound_size,
            config.bus.max_events,
            config.bus.max_errors,
            config.bus.minimum_priority_level,
        ));
        Self { config, networks, devices, timeseries, netflows, bus }
    }

    /// A clone of the shared event bus, e.g. for a UI to register its own
    /// listener against.
    pub fn bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.bus)
    }

    fn build_address_scanner(&self) -> AddressScanner {
        let d = &self.config.discovery;
        AddressScanner::new(AddressScannerConfig {
            arp: d.arp.enabled.then(|| ArpStage { timeout: d.arp.timeout }),
            icmp: d.icmp.enabled.then(|| IcmpStage {
                privileged: d.icmp.privileged,
                count: d.icmp.ping_count,
                timeout: d.icmp.timeout,
            }),
            snmp: d.snmp.enabled.then(|| SnmpStage {
                community: d.snmp.community.first().cloned().unwrap_or_default(),
                port: d.snmp.ports.first().copied().unwrap_or(161),
                timeout: d.snmp.timeout,
            }),
        })
    }

    /// Runs until `cancelled` is set. Spawns the bus's drain loop, four
    /// worker pools, four interval tickers, optionally bootstraps the
    /// network store, then dispatches bus events synchronously until
    /// cancellation (spec §4.7).
    pub fn run(&self, cancelled: Arc<AtomicBool>) -> Result<()> {
        let bus_thread = {
            let bus = Arc::clone(&self.bus);
            thread::spawn(move || {
                if let Err(e) = bus.run() {
                    error!("event bus exited with error: {e}");
                }
            })
        };

        let listener = self.bus.add_listener()?;

        let (address_scan_tx, address_scan_rx) = channel::<Addr>();
        let (enrichment_tx, enrichment_rx) = channel::<Device>();
        let (perf_ping_tx, perf_ping_rx) = channel::<Device>();
        let (network_scan_tx, network_scan_rx) = channel::<Network>();

        let address_scan_pool = WorkerPool::new("address-scan");
        let (address_scan_results, address_scan_errors) = address_scan_pool.run(
            AddressScanCtx { scanner: Arc::new(self.build_address_scanner()) },
            self.config.discovery.max_workers,
            address_scan_rx,
            |ctx: &AddressScanCtx, addr: &Addr| ctx.scanner.scan(*addr),
        );

        let enrichment_pool = WorkerPool::new("enrichment");
        let (enrichment_results, enrichment_errors) = enrichment_pool.run(
            EnrichmentCtx { config: self.config.enrichment.clone() },
            self.config.enrichment.max_workers,
            enrichment_rx,
            enrich_device,
        );

        let perf_ping_pool = WorkerPool::new("perf-ping");
        let perf_ping_config = PingerConfig::builder()
            .privileged(self.config.pinger.privileged)
            .ping_count(self.config.pinger.ping_count)
            .timeout(self.config.pinger.timeout)
            .build()
            .map_err(|e| MasonError::Wire(e.to_string()))?;
        let (perf_ping_results, perf_ping_errors) = perf_ping_pool.run(
            PerfPingCtx { config: perf_ping_config },
            self.config.pinger.max_workers,
            perf_ping_rx,
            |ctx: &PerfPingCtx, device: &Device| pinger::ping(device, &ctx.config),
        );

        let network_scan_pool = WorkerPool::new("network-scan");
        let (_network_scan_results, network_scan_errors) = network_scan_pool.run(
            NetworkScanCtx { address_scan_tx: address_scan_tx.clone(), cancelled: Arc::clone(&cancelled) },
            self.config.discovery.max_network_scanners,
            network_scan_rx,
            |ctx: &NetworkScanCtx, network: &Network| {
                network_scan::enumerate(network, &ctx.cancelled, |addr| {
                    ctx.address_scan_tx
                        .send(addr)
                        .map_err(|_| MasonError::Wire("address-scan channel closed".into()))
                })
            },
        );

        let mut background = Vec::new();
        background.push(forward_events(Arc::clone(&self.bus), address_scan_results));
        background.push(forward_errors("address-scan", Arc::clone(&self.bus), address_scan_errors));
        background.push(forward_enrichment_results(
            Arc::clone(&self.bus),
            Arc::clone(&self.devices),
            enrichment_results,
        ));
        background.push(forward_errors("enrichment", Arc::clone(&self.bus), enrichment_errors));
        background.push(forward_perf_ping_results(
            Arc::clone(&self.bus),
            Arc::clone(&self.devices),
            Arc::clone(&self.timeseries),
            perf_ping_results,
        ));
        background.push(forward_errors("perf-ping", Arc::clone(&self.bus), perf_ping_errors));
        background.push(forward_errors("network-scan", Arc::clone(&self.bus), network_scan_errors));
        background.extend(self.spawn_tickers(Arc::clone(&cancelled)));

        if self.config.netflows.enabled {
            let (datagram_tx, datagram_rx) = channel::<Vec<u8>>();
            let netflow_config = self.config.netflows.clone();
            let listener_cancelled = Arc::clone(&cancelled);
            background.push(thread::spawn(move || {
                if let Err(e) = listener::listen(
                    netflow_config.listen_address,
                    netflow_config.packet_size,
                    datagram_tx,
                    &listener_cancelled,
                ) {
                    error!("ipfix listener exited with error: {e}");
                }
            }));

            let decode_pool = WorkerPool::new("ipfix-decode");
            let (decode_results, decode_errors) = decode_pool.run(
                IpfixCtx { cache: Arc::new(TemplateCache::new()) },
                self.config.netflows.max_workers,
                datagram_rx,
                |ctx: &IpfixCtx, datagram: &Vec<u8>| decode_message(datagram, &ctx.cache),
            );
            background.push(forward_netflows(Arc::clone(&self.bus), Arc::clone(&self.netflows), decode_results));
            background.push(forward_errors("ipfix-decode", Arc::clone(&self.bus), decode_errors));
        }

        if self.config.discovery.bootstrap_on_first_run && self.networks.count()? == 0 {
            for network in bootstrap_networks() {
                self.bus.publish(Event::DiscoveredNetwork { prefix: network.prefix })?;
            }
        }

        loop {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            match listener.recv_timeout(POLL_INTERVAL) {
                Ok(event) => {
                    self.handle_event(event, &enrichment_tx, &perf_ping_tx, &network_scan_tx)?;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        drop(address_scan_tx);
        drop(enrichment_tx);
        drop(perf_ping_tx);
        drop(network_scan_tx);

        for handle in background {
            let _ = handle.join();
        }
        let _ = bus_thread.join();
        Ok(())
    }

    fn spawn_tickers(&self, cancelled: Arc<AtomicBool>) -> Vec<thread::JoinHandle<()>> {
        let mut handles = Vec::new();

        handles.push(spawn_interval_ticker(
            Arc::clone(&cancelled),
            self.config.discovery.network_scan_interval,
            {
                let bus = Arc::clone(&self.bus);
                move || {
                    let _ = bus.publish(Event::ScanAllNetworksRequest);
                }
            },
        ));

        handles.push(spawn_interval_ticker(Arc::clone(&cancelled), self.config.pinger.check_interval, {
            let bus = Arc::clone(&self.bus);
            move || {
                let _ = bus.publish(Event::PerfPingDevicesEvent);
            }
        }));

        handles.push(spawn_interval_ticker(
            Arc::clone(&cancelled),
            self.config.discovery.snmp.arp_table_rescan_interval,
            {
                let bus = Arc::clone(&self.bus);
                let devices = Arc::clone(&self.devices);
                let interval_secs = self.config.discovery.snmp.arp_table_rescan_interval.as_secs();
                move || {
                    let now = Timestamp::now();
                    if let Ok(due) = devices.list_filtered(&|d: &Device| {
                        snmp_arp_table_rescan_filter(d, now, interval_secs)
                    }) {
                        for device in due {
                            let _ = bus.publish(Event::DiscoverDevicesFromSnmpDevice { device });
                        }
                    }
                }
            },
        ));

        handles.push(spawn_interval_ticker(
            Arc::clone(&cancelled),
            self.config.discovery.snmp.interface_rescan_interval,
            {
                let bus = Arc::clone(&self.bus);
                let devices = Arc::clone(&self.devices);
                let interval_secs = self.config.discovery.snmp.interface_rescan_interval.as_secs();
                move || {
                    let now = Timestamp::now();
                    if let Ok(due) = devices.list_filtered(&|d: &Device| {
                        snmp_interface_rescan_filter(d, now, interval_secs)
                    }) {
                        for device in due {
                            let _ = bus.publish(Event::DiscoverNetworksFromSnmpDevice { device });
                        }
                    }
                }
            },
        ));

        handles
    }

    fn handle_event(
        &self,
        event: Event,
        enrichment_tx: &Sender<Device>,
        perf_ping_tx: &Sender<Device>,
        network_scan_tx: &Sender<Network>,
    ) -> Result<()> {
        match event {
            Event::DeviceDiscovered { addr, mac, discovered_by, discovered_at, snmp } => {
                let mut device = Device::new(addr, mac.unwrap_or_default(), discovered_by, discovered_at);
                if let Some(info) = snmp {
                    device.snmp.name = info.name;
                    device.snmp.description = info.descr;
                    device.snmp.last_snmp_check = true;
                }
                match self.devices.add(device.clone()) {
                    Ok(()) => self.bus.publish(Event::DeviceAdded { device })?,
                    Err(MasonError::DeviceExists(_)) => {
                        self.devices.update(device)?;
                    }
                    Err(e) => return Err(e),
                }
            }
            Event::DeviceAdded { device } => {
                if self.config.enrichment.enabled {
                    self.bus.publish(Event::EnrichDeviceRequest { device })?;
                }
            }
            Event::DeviceUpdated { device } => {
                self.devices.update(device)?;
            }
            Event::DiscoveredNetwork { prefix } => {
                let network = Network::new(prefix);
                match self.networks.add(network.clone()) {
                    Ok(()) => {
                        self.bus.publish(Event::NetworkAdded { network: network.clone() })?;
                        if self.config.discovery.auto_discover_new_networks {
                            self.bus.publish(Event::ScanNetworkRequest { network })?;
                        }
                    }
                    Err(MasonError::NetworkExists(_)) => {}
                    Err(e) => return Err(e),
                }
            }
            Event::NetworkAdded { .. } => {}
            Event::ScanNetworkRequest { mut network } => {
                network.last_scan = Timestamp::now();
                self.networks.update(network.clone())?;
                let network_scan_tx = network_scan_tx.clone();
                thread::spawn(move || {
                    let _ = network_scan_tx.send(network);
                });
            }
            Event::ScanAllNetworksRequest => {
                let now = Timestamp::now();
                let interval_secs = self.config.discovery.network_scan_interval.as_secs();
                for network in self
                    .networks
                    .list_filtered(&|n: &Network| network_rescan_filter(n, now, interval_secs))?
                {
                    self.bus.publish(Event::ScanNetworkRequest { network })?;
                }
            }
            Event::PerfPingDevicesEvent => {
                let now = Timestamp::now();
                let default_interval = self.config.pinger.default_interval.as_secs();
                let server_interval = self.config.pinger.server_interval.as_secs();
                for device in self.devices.list_filtered(&|d: &Device| {
                    pinger::performance_pinger_filter(d, now, default_interval, server_interval)
                })? {
                    let _ = perf_ping_tx.send(device);
                }
            }
            Event::EnrichDeviceRequest { device } => {
                let _ = enrichment_tx.send(device);
            }
            Event::DiscoverNetworksFromSnmpDevice { device } => {
                let bus = Arc::clone(&self.bus);
                let networks = Arc::clone(&self.networks);
                let timeout = self.config.discovery.snmp.timeout;
                thread::spawn(move || match snmp_walk::discover_networks(&device, timeout) {
                    Ok(prefixes) => {
                        for prefix in prefixes {
                            let _ = networks.upsert(Network::new(prefix));
                        }
                        let mut updated = device;
                        updated.snmp.has_interfaces = true;
                        updated.snmp.last_interfaces_scan = Timestamp::now();
                        let _ = bus.publish(Event::DeviceUpdated { device: updated });
                    }
                    Err(e) => {
                        let _ = bus.publish(Event::Error { source: "snmp-networks".into(), message: e.to_string() });
                    }
                });
            }
            Event::DiscoverDevicesFromSnmpDevice { device } => {
                let bus = Arc::clone(&self.bus);
                let timeout = self.config.discovery.snmp.timeout;
                thread::spawn(move || match snmp_walk::discover_devices(&device, timeout) {
                    Ok(entries) => {
                        let now = Timestamp::now();
                        for (addr, mac) in entries {
                            let _ = bus.publish(Event::DeviceDiscovered {
                                addr,
                                mac: Some(mac),
                                discovered_by: DiscoverySource::SnmpArp,
                                discovered_at: now,
                                snmp: None,
                            });
                        }
                        let mut updated = device;
                        updated.snmp.has_arp_table = true;
                        updated.snmp.last_arp_table_scan = now;
                        let _ = bus.publish(Event::DeviceUpdated { device: updated });
                    }
                    Err(e) => {
                        let _ = bus.publish(Event::Error { source: "snmp-devices".into(), message: e.to_string() });
                    }
                });
            }
            Event::Error { .. } | Event::NoDeviceDiscovered { .. } | Event::Done => {}
        }
        Ok(())
    }
}

#[derive(Clone)]
struct AddressScanCtx {
    scanner: Arc<AddressScanner>,
}

#[derive(Clone)]
struct EnrichmentCtx {
    config: EnrichmentConfig,
}

#[derive(Clone)]
struct PerfPingCtx {
    config: PingerConfig,
}

#[derive(Clone)]
struct NetworkScanCtx {
    address_scan_tx: Sender<Addr>,
    cancelled: Arc<AtomicBool>,
}

struct EnrichmentOutcome {
    device: Device,
    discovered_snmp_credentials: bool,
}

#[derive(Clone)]
struct IpfixCtx {
    cache: Arc<TemplateCache>,
}

fn is_no_device(error: &MasonError) -> bool {
    matches!(
        error,
        MasonError::NoResponseFromRemote(_) | MasonError::ConnectionRefused(_) | MasonError::EmptyResponse(_)
    )
}

/// Runs the default enrichment set against one device (spec §4.5): reverse
/// DNS, OUI vendor lookup, an SNMP identity probe tried across every
/// configured community/port pair, and a bounded TCP connect scan.
fn enrich_device(ctx: &EnrichmentCtx, device: &Device) -> Result<EnrichmentOutcome> {
    let config = &ctx.config;
    let mut updated = device.clone();

    if config.dns_enabled {
        if let Some(name) = dns::resolve(updated.identity.addr) {
            updated.meta.dns_name = name;
        }
    }

    if config.oui_enabled {
        if let Some(vendor) = oui::lookup(&updated.identity.mac) {
            updated.meta.manufacturer = vendor;
        }
    }

    let mut discovered_snmp_credentials = false;
    if config.snmp.enabled {
        if let Some(v4) = updated.identity.addr.as_v4() {
            'communities: for community in &config.snmp.community {
                for &port in &config.snmp.ports {
                    let probe = SnmpProbe::builder()
                        .target(v4)
                        .port(port)
                        .community(community.clone())
                        .timeout(config.snmp.timeout)
                        .build()
                        .map_err(|e| MasonError::Wire(e.to_string()))?;

                    match probe.get_system_info() {
                        Ok(info) => {
                            updated.snmp.name = info.name;
                            updated.snmp.description = info.descr;
                            updated.snmp.community = community.clone();
                            updated.snmp.port = port;
                            updated.snmp.last_snmp_check = true;
                            discovered_snmp_credentials = true;
                            break 'communities;
                        }
                        Err(e) if is_no_device(&e) => continue,
                        Err(e) => return Err(e),
                    }
                }
            }
        }
    }

    if config.portscan.enabled {
        if let Some(v4) = updated.identity.addr.as_v4() {
            let ports = portscan::scan(
                v4,
                config.portscan.port_list.clone(),
                config.portscan.port_timeout,
                config.portscan.max_workers,
            )?;
            updated.server.ports = ports;
            updated.server.last_scan = Timestamp::now();
        }
    }

    Ok(EnrichmentOutcome { device: updated, discovered_snmp_credentials })
}

fn spawn_interval_ticker(
    cancelled: Arc<AtomicBool>,
    interval: Duration,
    mut tick: impl FnMut() + Send + 'static,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let interval = interval.max(POLL_INTERVAL);
        let mut elapsed = Duration::ZERO;
        while !cancelled.load(Ordering::Relaxed) {
            thread::sleep(POLL_INTERVAL);
            elapsed += POLL_INTERVAL;
            if elapsed >= interval {
                tick();
                elapsed = Duration::ZERO;
            }
        }
    })
}

fn forward_events(bus: Arc<EventBus>, rx: Receiver<Event>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for event in rx.iter() {
            let _ = bus.publish(event);
        }
    })
}

fn forward_errors<In>(source: &'static str, bus: Arc<EventBus>, rx: Receiver<(In, MasonError)>) -> thread::JoinHandle<()>
where
    In: std::fmt::Debug + Send + 'static,
{
    thread::spawn(move || {
        for (item, err) in rx.iter() {
            let _ = bus.publish(Event::Error { source: source.to_string(), message: format!("{err} ({item:?})") });
        }
    })
}

fn forward_enrichment_results(
    bus: Arc<EventBus>,
    devices: Arc<dyn DeviceStore>,
    rx: Receiver<EnrichmentOutcome>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for outcome in rx.iter() {
            if let Err(e) = devices.update(outcome.device.clone()) {
                let _ = bus.publish(Event::Error { source: "enrichment".into(), message: e.to_string() });
                continue;
            }
            let _ = bus.publish(Event::DeviceUpdated { device: outcome.device.clone() });
            if outcome.discovered_snmp_credentials {
                let _ = bus.publish(Event::DiscoverNetworksFromSnmpDevice { device: outcome.device.clone() });
                let _ = bus.publish(Event::DiscoverDevicesFromSnmpDevice { device: outcome.device });
            }
        }
    })
}

fn forward_perf_ping_results(
    bus: Arc<EventBus>,
    devices: Arc<dyn DeviceStore>,
    timeseries: Arc<dyn TimeseriesStore>,
    rx: Receiver<PingResult>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for result in rx.iter() {
            if let Err(e) = devices.update(result.device.clone()) {
                let _ = bus.publish(Event::Error { source: "perf-ping".into(), message: e.to_string() });
                continue;
            }
            if let Err(e) = timeseries.write_performance_ping(result.start, &result.device, &result.stats) {
                let _ = bus.publish(Event::Error { source: "perf-ping".into(), message: e.to_string() });
            }
            let _ = bus.publish(Event::DeviceUpdated { device: result.device });
        }
    })
}

/// Persists each batch of decoded flows, surfacing store failures as bus
/// errors rather than dropping the batch silently. Empty batches (a
/// datagram that held only templates) are skipped.
fn forward_netflows(bus: Arc<EventBus>, netflows: Arc<dyn NetflowStore>, rx: Receiver<Vec<IpFlow>>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for flows in rx.iter() {
            if flows.is_empty() {
                continue;
            }
            if let Err(e) = netflows.add_netflows(flows) {
                let _ = bus.publish(Event::Error { source: "ipfix".into(), message: e.to_string() });
            }
        }
    })
}

#[cfg(test)]
#[path = "./orchestrator_tests.rs"]
mod tests;
