use super::*;

#[test]
fn builder_defaults_max_hops_to_thirty() {
    let probe = TracerouteProbe::builder()
        .target(Ipv4Addr::new(10, 0, 0, 1))
        .build()
        .unwrap();

    assert_eq!(probe.max_hops, 30);
    assert!(!probe.privileged);
}

#[test]
fn probe_never_panics_even_without_raw_socket_privilege() {
    let probe = TracerouteProbe::builder()
        .target(Ipv4Addr::new(203, 0, 113, 250))
        .max_hops(2u8)
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    // Sandboxed test environments frequently lack the capability to open
    // an ICMP socket at all; either outcome is acceptable as long as
    // nothing panics and a capability error surfaces as `Err`.
    match probe.probe() {
        Ok(hops) => assert!(hops.len() <= 2),
        Err(_) => {}
    }
}
