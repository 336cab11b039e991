use super::*;

#[test]
fn builder_defaults_timeout_and_workers() {
    let probe = TcpProbe::builder()
        .target(Ipv4Addr::new(127, 0, 0, 1))
        .ports(PortList::from_ports([80, 443]))
        .build()
        .unwrap();

    assert_eq!(probe.timeout, Duration::from_secs(1));
    assert_eq!(probe.max_workers, 8);
}

#[test]
fn probe_returns_no_open_ports_for_closed_targets() {
    // 203.0.113.0/24 is reserved for documentation and never listens.
    let probe = TcpProbe::builder()
        .target(Ipv4Addr::new(203, 0, 113, 250))
        .ports(PortList::from_ports([9, 19, 23]))
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let open = probe.probe();
    assert!(open.is_empty());
}

#[test]
fn probe_handles_empty_port_list() {
    let probe = TcpProbe::builder()
        .target(Ipv4Addr::new(127, 0, 0, 1))
        .ports(PortList::new())
        .build()
        .unwrap();

    assert!(probe.probe().is_empty());
}
