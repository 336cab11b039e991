use super::*;
use crate::model::device::DiscoverySource;
use crate::model::{addr::Addr, mac::Mac, port_list::PortList};
use std::net::Ipv4Addr;

fn device() -> Device {
    Device::new(
        Addr::from_v4(Ipv4Addr::new(10, 0, 0, 1)),
        Mac::Empty,
        DiscoverySource::Arp,
        Timestamp::now(),
    )
}

#[test]
fn never_scanned_device_is_due() {
    let device = device();
    assert!(port_scanner_filter(&device, Timestamp::from_secs(1_000), 300, 60));
}

#[test]
fn non_server_uses_default_interval() {
    let mut device = device();
    device.server.last_scan = Timestamp::from_secs(1_000);
    assert!(!port_scanner_filter(&device, Timestamp::from_secs(1_100), 300, 60));
    assert!(port_scanner_filter(&device, Timestamp::from_secs(1_400), 300, 60));
}

#[test]
fn server_uses_server_interval() {
    let mut device = device();
    device.server.ports = PortList::from_ports([22, 80]);
    device.server.last_scan = Timestamp::from_secs(1_000);
    assert!(!port_scanner_filter(&device, Timestamp::from_secs(1_050), 300, 60));
    assert!(port_scanner_filter(&device, Timestamp::from_secs(1_100), 300, 60));
}
