use super::*;
use std::str::FromStr;

#[test]
fn key_matches_normalized_prefix_string() {
    let prefix = Prefix::from_str("192.168.1.40/24").unwrap();
    let network = Network::new(prefix);
    assert_eq!(network.key(), "192.168.1.0/24");
}

#[test]
fn new_network_has_zero_last_scan() {
    let prefix = Prefix::from_str("10.0.0.0/8").unwrap();
    let network = Network::new(prefix);
    assert!(network.last_scan.is_zero());
}
