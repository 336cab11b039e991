use super::*;
use std::net::Ipv4Addr;

#[test]
fn round_trips_through_canonical_string() {
    let cases = vec!["192.168.1.1", "10.0.0.255", "::1", "fe80::1"];

    for case in cases {
        let addr = Addr::from_str(case).expect("should parse");
        let rendered = addr.to_string();
        let reparsed = Addr::from_str(&rendered).expect("should reparse");
        assert_eq!(addr, reparsed);
    }
}

#[test]
fn orders_byte_wise() {
    let a = Addr::from_v4(Ipv4Addr::new(192, 168, 1, 1));
    let b = Addr::from_v4(Ipv4Addr::new(192, 168, 1, 2));
    assert!(a < b);
}

#[test]
fn distinguishes_v4_and_v6() {
    let v4 = Addr::from_v4(Ipv4Addr::new(1, 2, 3, 4));
    assert!(v4.is_ipv4());
    assert!(!v4.is_ipv6());

    let v6 = Addr::from_str("::1").unwrap();
    assert!(v6.is_ipv6());
    assert!(v6.as_v4().is_none());
}

#[test]
fn serializes_as_plain_string() {
    let addr = Addr::from_v4(Ipv4Addr::new(10, 0, 0, 1));
    let json = serde_json::to_string(&addr).unwrap();
    assert_eq!(json, "\"10.0.0.1\"");
    let back: Addr = serde_json::from_str(&json).unwrap();
    assert_eq!(back, addr);
}
