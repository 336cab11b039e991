use super::*;
use std::net::Ipv4Addr;

#[test]
fn unroutable_address_resolves_to_none() {
    let addr = Addr::from_v4(Ipv4Addr::new(203, 0, 113, 250));
    assert_eq!(resolve(addr), None);
}
