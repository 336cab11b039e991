use super::*;

#[test]
fn returns_error_for_bogus_interface_name() {
    let res = get_interface("definitely-not-a-real-interface-name");
    assert!(res.is_err());
}

#[cfg(target_os = "macos")]
#[test]
fn returns_interface_by_name() {
    let res = get_interface("en0");
    assert!(res.is_ok());
}

#[cfg(target_os = "linux")]
#[test]
fn returns_interface_by_name() {
    let res = get_interface("eth0");
    assert!(res.is_ok());
}

#[test]
fn usable_interfaces_excludes_loopback() {
    for iface in usable_interfaces() {
        assert_ne!(iface.ipv4, Ipv4Addr::LOCALHOST);
    }
}

#[test]
fn returns_an_available_port_on_system() {
    let res = get_available_port();
    assert!(res.is_ok());
    assert!(res.unwrap() > 0);
}

#[test]
fn ipv4_and_prefix_from_interface() {
    let iface = pnet::datalink::interfaces()
        .into_iter()
        .find(|e| e.is_up() && !e.is_loopback() && e.ips.iter().any(|i| i.is_ipv4()));
    let Some(iface) = iface else {
        // test environment has no usable interface; nothing to assert
        return;
    };
    let (ipv4, prefix) = ipv4_and_prefix(&iface).unwrap();
    assert!(!ipv4.is_unspecified());
    assert!(prefix.prefix_len() <= 32);
}
