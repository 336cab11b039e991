use super::*;
use crate::model::device::DiscoverySource;
use crate::model::timestamp::Timestamp;
use std::net::Ipv6Addr;

fn device_with_addr(addr: Addr) -> Device {
    Device::new(addr, Mac::Empty, DiscoverySource::Snmp, Timestamp::now())
}

#[test]
fn ipv6_device_is_rejected_before_any_network_call() {
    let device = device_with_addr(Addr::from(Ipv6Addr::LOCALHOST));
    let networks = discover_networks(&device, Duration::from_millis(50));
    assert!(matches!(
        networks,
        Err(MasonError::Ipv6ExcludedFromDiscovery(_))
    ));

    let devices = discover_devices(&device, Duration::from_millis(50));
    assert!(matches!(
        devices,
        Err(MasonError::Ipv6ExcludedFromDiscovery(_))
    ));
}
