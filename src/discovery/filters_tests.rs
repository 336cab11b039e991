use super::*;
use crate::model::{addr::Addr, device::DiscoverySource};
use std::net::Ipv4Addr;

fn device() -> Device {
    Device::new(
        Addr::from_v4(Ipv4Addr::new(10, 0, 0, 5)),
        crate::model::mac::Mac::Empty,
        DiscoverySource::Snmp,
        Timestamp::now(),
    )
}

#[test]
fn network_rescan_filter_admits_never_scanned() {
    let network = Network::new(
        crate::model::prefix::Prefix::new(Addr::from_v4(Ipv4Addr::new(10, 0, 0, 0)), 24).unwrap(),
    );
    assert!(network_rescan_filter(&network, Timestamp::now(), 300));
}

#[test]
fn network_rescan_filter_rejects_recently_scanned() {
    let mut network = Network::new(
        crate::model::prefix::Prefix::new(Addr::from_v4(Ipv4Addr::new(10, 0, 0, 0)), 24).unwrap(),
    );
    let now = Timestamp::from_secs(1_000);
    network.last_scan = now;
    assert!(!network_rescan_filter(&network, now, 300));
}

#[test]
fn snmp_arp_table_filter_rejects_when_capability_unknown() {
    let dev = device();
    assert!(!snmp_arp_table_rescan_filter(&dev, Timestamp::now(), 300));
}

#[test]
fn snmp_arp_table_filter_rejects_when_confirmed_absent() {
    let mut dev = device();
    dev.snmp.has_arp_table = false;
    dev.snmp.last_arp_table_scan = Timestamp::from_secs(1_000);
    assert!(!snmp_arp_table_rescan_filter(&dev, Timestamp::from_secs(5_000), 300));
}

#[test]
fn snmp_arp_table_filter_admits_present_and_stale() {
    let mut dev = device();
    dev.snmp.has_arp_table = true;
    dev.snmp.last_arp_table_scan = Timestamp::ZERO;
    assert!(snmp_arp_table_rescan_filter(&dev, Timestamp::now(), 300));

    dev.snmp.last_arp_table_scan = Timestamp::from_secs(1_000);
    assert!(!snmp_arp_table_rescan_filter(&dev, Timestamp::from_secs(1_050), 300));
    assert!(snmp_arp_table_rescan_filter(&dev, Timestamp::from_secs(2_000), 300));
}

#[test]
fn snmp_interface_filter_mirrors_arp_table_semantics() {
    let mut dev = device();
    assert!(!snmp_interface_rescan_filter(&dev, Timestamp::now(), 300));

    dev.snmp.has_interfaces = true;
    assert!(snmp_interface_rescan_filter(&dev, Timestamp::now(), 300));
}
