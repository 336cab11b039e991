use super::*;
use crate::model::{addr::Addr, timestamp::Timestamp};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn discovered(addr: Ipv4Addr) -> Event {
    Event::DeviceDiscovered {
        addr: Addr::from_v4(addr),
        mac: None,
        discovered_by: DiscoverySource::Arp,
        discovered_at: Timestamp::now(),
        snmp: None,
    }
}

#[test]
fn delivers_published_events_to_listeners() {
    let bus = EventBus::new(16, 16, 16, 0);
    let listener = bus.add_listener().unwrap();

    bus.publish(discovered(Ipv4Addr::new(10, 0, 0, 1))).unwrap();
    bus.publish(Event::Done).unwrap();

    thread::spawn(move || {
        let _ = bus.run();
    });

    let first = listener.recv_timeout(Duration::from_secs(1)).unwrap();
    assert!(matches!(first, Event::DeviceDiscovered { .. }));
    let second = listener.recv_timeout(Duration::from_secs(1)).unwrap();
    assert!(matches!(second, Event::Done));
}

#[test]
fn drops_events_when_inbound_buffer_is_full() {
    let bus = EventBus::new(1, 16, 16, 0);

    bus.publish(discovered(Ipv4Addr::new(10, 0, 0, 1))).unwrap();
    // nothing is draining the buffer yet, so this one must be dropped
    // rather than blocking the publisher.
    let result = bus.publish(discovered(Ipv4Addr::new(10, 0, 0, 2)));
    assert!(result.is_ok());
}

#[test]
fn history_filters_below_minimum_priority() {
    let bus = Arc::new(EventBus::new(16, 16, 16, priority::DISCOVERED_NETWORK));

    bus.publish(discovered(Ipv4Addr::new(10, 0, 0, 1))).unwrap();
    bus.publish(Event::DiscoveredNetwork {
        prefix: Prefix::new(Addr::from_v4(Ipv4Addr::new(10, 0, 0, 0)), 24).unwrap(),
    })
    .unwrap();

    let bus_clone = bus.clone();
    thread::spawn(move || {
        let _ = bus_clone.run();
    });
    thread::sleep(Duration::from_millis(50));

    let history = bus.history().unwrap();
    assert_eq!(history.len(), 1);
    assert!(matches!(history[0], Event::DiscoveredNetwork { .. }));
}

#[test]
fn errors_are_recorded_separately_from_history() {
    let bus = Arc::new(EventBus::new(16, 16, 16, 0));
    bus.publish(Event::Error {
        source: "test".into(),
        message: "boom".into(),
    })
    .unwrap();

    let bus_clone = bus.clone();
    thread::spawn(move || {
        let _ = bus_clone.run();
    });
    thread::sleep(Duration::from_millis(50));

    assert_eq!(bus.errors().unwrap().len(), 1);
    assert!(bus.history().unwrap().is_empty());
}
