//! Rescan admission filter for the TCP port-scan enrichment (spec §4.5
//! "TCP port scan"): unscanned devices, servers overdue per their own
//! interval, and non-servers overdue per the default interval.

use crate::model::{device::Device, timestamp::Timestamp};

/// Returns true if `device` is due for a port scan: it has never been
/// scanned, or its last scan is older than `server_interval_secs` (if it's
/// already a server, i.e. has open ports) or `default_interval_secs`
/// (otherwise).
pub fn port_scanner_filter(
    device: &Device,
    now: Timestamp,
    default_interval_secs: u64,
    server_interval_secs: u64,
) -> bool {
    let interval = if device.is_server() {
        server_interval_secs
    } else {
        default_interval_secs
    };
    device.server.last_scan.is_stale(now, interval)
}

#[cfg(test)]
#[path = "./filters_tests.rs"]
mod tests;
