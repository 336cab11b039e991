use super::*;
use crate::model::mac::Mac;
use std::net::Ipv4Addr;
use std::str::FromStr;

fn addr(s: &str) -> Addr {
    Addr::from_v4(Ipv4Addr::from_str(s).unwrap())
}

#[test]
fn merge_of_unchanged_incoming_device_is_noop() {
    let mut existing = Device::new(
        addr("10.0.0.1"),
        Mac::from_str("aa:bb:cc:dd:ee:01").unwrap(),
        DiscoverySource::Arp,
        Timestamp::from_secs(10),
    );
    existing.identity.name = "host".to_string();
    existing.snmp.has_arp_table = true;

    let incoming = Device::new(addr("10.0.0.1"), Mac::Empty, DiscoverySource::Arp, Timestamp::ZERO);

    let updated = existing.merge(&incoming);

    assert!(!updated);
    assert_eq!(existing.identity.name, "host");
    assert!(existing.snmp.has_arp_table);
}

#[test]
fn first_seen_never_regresses() {
    let mut existing = Device::new(addr("10.0.0.2"), Mac::Empty, DiscoverySource::Ping, Timestamp::ZERO);
    existing.performance_ping.first_seen = Timestamp::from_secs(100);

    let mut incoming = existing.clone();
    incoming.performance_ping.first_seen = Timestamp::from_secs(50);

    existing.merge(&incoming);

    assert_eq!(existing.performance_ping.first_seen, Timestamp::from_secs(100));
}

#[test]
fn first_seen_adopted_from_incoming_when_unset() {
    let mut existing = Device::new(addr("10.0.0.2"), Mac::Empty, DiscoverySource::Ping, Timestamp::ZERO);
    let mut incoming = existing.clone();
    incoming.performance_ping.first_seen = Timestamp::from_secs(50);

    let updated = existing.merge(&incoming);

    assert!(updated);
    assert_eq!(existing.performance_ping.first_seen, Timestamp::from_secs(50));
}

#[test]
fn has_arp_table_never_flips_true_to_false() {
    let mut existing = Device::new(addr("10.0.0.3"), Mac::Empty, DiscoverySource::Snmp, Timestamp::ZERO);
    existing.snmp.has_arp_table = true;

    let mut incoming = existing.clone();
    incoming.snmp.has_arp_table = false;

    let updated = existing.merge(&incoming);

    assert!(!updated);
    assert!(existing.snmp.has_arp_table);
}

#[test]
fn has_arp_table_flips_false_to_true() {
    let mut existing = Device::new(addr("10.0.0.3"), Mac::Empty, DiscoverySource::Snmp, Timestamp::ZERO);
    let mut incoming = existing.clone();
    incoming.snmp.has_arp_table = true;

    let updated = existing.merge(&incoming);

    assert!(updated);
    assert!(existing.snmp.has_arp_table);
}

#[test]
fn is_server_iff_ports_non_empty() {
    let mut d = Device::new(addr("10.0.0.4"), Mac::Empty, DiscoverySource::Ping, Timestamp::ZERO);
    assert!(!d.is_server());
    d.server.ports.insert(22);
    assert!(d.is_server());
}

#[test]
fn dns_name_promotes_to_name_when_name_is_placeholder() {
    let mut existing = Device::new(addr("10.0.0.5"), Mac::Empty, DiscoverySource::Ping, Timestamp::ZERO);
    assert_eq!(existing.identity.name, "10.0.0.5");

    let mut incoming = existing.clone();
    incoming.meta.dns_name = "host.lan".to_string();

    existing.merge(&incoming);

    assert_eq!(existing.identity.name, "host.lan");
}

#[test]
fn update_from_ping_stats_marks_failure_without_touching_other_fields() {
    let mut d = Device::new(addr("10.0.0.6"), Mac::Empty, DiscoverySource::Ping, Timestamp::ZERO);
    d.performance_ping.mean = Duration::from_millis(5);

    d.update_from_ping_stats(0, Duration::from_millis(99), Duration::from_millis(99), Timestamp::from_secs(1));

    assert!(d.performance_ping.last_failed);
    assert_eq!(d.performance_ping.mean, Duration::from_millis(5));
    assert!(d.performance_ping.first_seen.is_zero());
}

#[test]
fn update_from_ping_stats_sets_first_seen_on_first_success() {
    let mut d = Device::new(addr("10.0.0.7"), Mac::Empty, DiscoverySource::Ping, Timestamp::ZERO);

    d.update_from_ping_stats(3, Duration::from_millis(1), Duration::from_millis(2), Timestamp::from_secs(10));

    assert!(!d.performance_ping.last_failed);
    assert_eq!(d.performance_ping.first_seen, Timestamp::from_secs(10));
    assert_eq!(d.performance_ping.mean, Duration::from_millis(1));
}
