//! MAC vendor (OUI) enrichment (spec §4.5 "OUI").
//!
//! Lifted from the teacher's `scanners/arp_scanner.rs`
//! (`oui_data::lookup(&mac.to_string()).map(|v| v.organization().to_owned())`).

use crate::model::mac::Mac;

/// Looks up `mac`'s organization from its 24-bit OUI prefix. Returns
/// `None` for an empty MAC or an unrecognized prefix.
pub fn lookup(mac: &Mac) -> Option<String> {
    if mac.is_empty() {
        return None;
    }
    let pnet_mac = mac.as_pnet()?;
    oui_data::lookup(&pnet_mac.to_string())
        .map(|vendor| vendor.organization().to_owned())
}

#[cfg(test)]
#[path = "./oui_tests.rs"]
mod tests;
