use super::*;
use crate::model::prefix::Prefix;
use crate::store::memory::{MemoryDeviceStore, MemoryNetflowStore, MemoryNetworkStore, MemoryTimeseriesStore};
use std::str::FromStr;
use std::sync::mpsc::RecvTimeoutError;

fn test_orchestrator(config: MasonConfig) -> (Orchestrator, Receiver<Event>) {
    let orchestrator = Orchestrator::new(
        config,
        Arc::new(MemoryNetworkStore::new()),
        Arc::new(MemoryDeviceStore::new()),
        Arc::new(MemoryTimeseriesStore::new()),
        Arc::new(MemoryNetflowStore::new()),
    );
    let listener = orchestrator.bus.add_listener().unwrap();
    let bus = orchestrator.bus();
    thread::spawn(move || {
        let _ = bus.run();
    });
    (orchestrator, listener)
}

fn channels() -> (Sender<Device>, Sender<Device>, Sender<Network>) {
    (channel().0, channel().0, channel().0)
}

#[test]
fn device_discovered_adds_and_republishes_as_added() {
    let (orchestrator, listener) = test_orchestrator(MasonConfig::default());
    let (enrichment_tx, perf_ping_tx, network_scan_tx) = channels();

    let addr = Addr::from_str("10.0.0.5").unwrap();
    orchestrator
        .handle_event(
            Event::DeviceDiscovered {
                addr,
                mac: None,
                discovered_by: DiscoverySource::Arp,
                discovered_at: Timestamp::now(),
                snmp: None,
            },
            &enrichment_tx,
            &perf_ping_tx,
            &network_scan_tx,
        )
        .unwrap();

    let event = listener.recv_timeout(Duration::from_secs(1)).unwrap();
    assert!(matches!(event, Event::DeviceAdded { .. }));
    assert_eq!(orchestrator.devices.count().unwrap(), 1);
}

#[test]
fn device_discovered_for_a_known_addr_merges_instead_of_readding() {
    let (orchestrator, listener) = test_orchestrator(MasonConfig::default());
    let (enrichment_tx, perf_ping_tx, network_scan_tx) = channels();
    let addr = Addr::from_str("10.0.0.6").unwrap();

    orchestrator
        .devices
        .add(Device::new(addr, crate::model::mac::Mac::Empty, DiscoverySource::Arp, Timestamp::now()))
        .unwrap();

    orchestrator
        .handle_event(
            Event::DeviceDiscovered {
                addr,
                mac: Some(crate::model::mac::Mac::broadcast()),
                discovered_by: DiscoverySource::Ping,
                discovered_at: Timestamp::now(),
                snmp: None,
            },
            &enrichment_tx,
            &perf_ping_tx,
            &network_scan_tx,
        )
        .unwrap();

    assert_eq!(orchestrator.devices.count().unwrap(), 1);
    let stored = orchestrator.devices.get_by_addr(addr).unwrap().unwrap();
    assert!(!stored.identity.mac.is_empty());
    assert!(matches!(listener.recv_timeout(Duration::from_millis(200)), Err(RecvTimeoutError::Timeout)));
}

#[test]
fn discovered_network_auto_scans_when_enabled() {
    let (orchestrator, listener) = test_orchestrator(MasonConfig::default());
    let (enrichment_tx, perf_ping_tx, network_scan_tx) = channels();

    orchestrator
        .handle_event(
            Event::DiscoveredNetwork { prefix: Prefix::from_str("10.0.0.0/24").unwrap() },
            &enrichment_tx,
            &perf_ping_tx,
            &network_scan_tx,
        )
        .unwrap();

    let first = listener.recv_timeout(Duration::from_secs(1)).unwrap();
    assert!(matches!(first, Event::NetworkAdded { .. }));
    let second = listener.recv_timeout(Duration::from_secs(1)).unwrap();
    assert!(matches!(second, Event::ScanNetworkRequest { .. }));
    assert_eq!(orchestrator.networks.count().unwrap(), 1);
}

#[test]
fn discovered_network_already_present_is_silently_ignored() {
    let (orchestrator, listener) = test_orchestrator(MasonConfig::default());
    let (enrichment_tx, perf_ping_tx, network_scan_tx) = channels();
    let prefix = Prefix::from_str("10.0.0.0/24").unwrap();

    orchestrator.networks.add(Network::new(prefix)).unwrap();

    orchestrator
        .handle_event(
            Event::DiscoveredNetwork { prefix },
            &enrichment_tx,
            &perf_ping_tx,
            &network_scan_tx,
        )
        .unwrap();

    assert_eq!(orchestrator.networks.count().unwrap(), 1);
    assert!(matches!(listener.recv_timeout(Duration::from_millis(200)), Err(RecvTimeoutError::Timeout)));
}

#[test]
fn scan_all_networks_request_enqueues_only_stale_networks() {
    let (orchestrator, listener) = test_orchestrator(MasonConfig::default());
    let (enrichment_tx, perf_ping_tx, network_scan_tx) = channels();

    let stale = Network::new(Prefix::from_str("10.0.0.0/24").unwrap());
    let mut fresh = Network::new(Prefix::from_str("10.0.1.0/24").unwrap());
    fresh.last_scan = Timestamp::now();
    orchestrator.networks.add(stale).unwrap();
    orchestrator.networks.add(fresh).unwrap();

    orchestrator
        .handle_event(Event::ScanAllNetworksRequest, &enrichment_tx, &perf_ping_tx, &network_scan_tx)
        .unwrap();

    let event = listener.recv_timeout(Duration::from_secs(1)).unwrap();
    match event {
        Event::ScanNetworkRequest { network } => assert_eq!(network.key(), "10.0.0.0/24"),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(matches!(listener.recv_timeout(Duration::from_millis(200)), Err(RecvTimeoutError::Timeout)));
}

#[test]
fn perf_ping_devices_event_enqueues_only_due_devices() {
    let (orchestrator, _listener) = test_orchestrator(MasonConfig::default());
    let (enrichment_tx, _unused_perf_ping_tx, network_scan_tx) = channels();
    let (perf_ping_tx, perf_ping_rx) = channel::<Device>();

    let due = Device::new(
        Addr::from_str("10.0.0.10").unwrap(),
        crate::model::mac::Mac::Empty,
        DiscoverySource::Arp,
        Timestamp::now(),
    );
    let mut not_due = Device::new(
        Addr::from_str("10.0.0.11").unwrap(),
        crate::model::mac::Mac::Empty,
        DiscoverySource::Arp,
        Timestamp::now(),
    );
    not_due.performance_ping.last_seen = Timestamp::now();
    let due_addr = due.identity.addr;
    orchestrator.devices.add(due).unwrap();
    orchestrator.devices.add(not_due).unwrap();

    orchestrator
        .handle_event(Event::PerfPingDevicesEvent, &enrichment_tx, &perf_ping_tx, &network_scan_tx)
        .unwrap();

    let pinged = perf_ping_rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(pinged.identity.addr, due_addr);
    assert!(matches!(perf_ping_rx.recv_timeout(Duration::from_millis(200)), Err(RecvTimeoutError::Timeout)));
}

#[test]
fn device_added_requests_enrichment_when_enabled() {
    let (orchestrator, _listener) = test_orchestrator(MasonConfig::default());
    let (_enrichment_tx, perf_ping_tx, network_scan_tx) = channels();
    let (real_enrichment_tx, real_enrichment_rx) = channel::<Device>();

    let device = Device::new(
        Addr::from_str("10.0.0.20").unwrap(),
        crate::model::mac::Mac::Empty,
        DiscoverySource::Arp,
        Timestamp::now(),
    );

    orchestrator
        .handle_event(
            Event::DeviceAdded { device: device.clone() },
            &real_enrichment_tx,
            &perf_ping_tx,
            &network_scan_tx,
        )
        .unwrap();

    let requested = real_enrichment_rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(requested.identity.addr, device.identity.addr);
}

#[test]
fn device_added_does_not_request_enrichment_when_disabled() {
    let mut config = MasonConfig::default();
    config.enrichment.enabled = false;
    let (orchestrator, _listener) = test_orchestrator(config);
    let (_enrichment_tx, perf_ping_tx, network_scan_tx) = channels();
    let (real_enrichment_tx, real_enrichment_rx) = channel::<Device>();

    let device = Device::new(
        Addr::from_str("10.0.0.21").unwrap(),
        crate::model::mac::Mac::Empty,
        DiscoverySource::Arp,
        Timestamp::now(),
    );

    orchestrator
        .handle_event(Event::DeviceAdded { device }, &real_enrichment_tx, &perf_ping_tx, &network_scan_tx)
        .unwrap();

    assert!(matches!(real_enrichment_rx.recv_timeout(Duration::from_millis(200)), Err(RecvTimeoutError::Timeout)));
}
