use super::*;

#[test]
fn bootstrap_networks_never_panics_and_has_no_duplicate_prefixes() {
    let networks = bootstrap_networks();
    let mut seen = std::collections::HashSet::new();
    for network in &networks {
        assert!(seen.insert(network.prefix.to_string()));
    }
}
