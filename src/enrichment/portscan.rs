//! TCP connect-scan enrichment (spec §4.5 "TCP port scan").
//!
//! Grounded on `probes::tcp`, the bounded `ThreadPool` connect-timeout
//! scanner; enrichment is a plain connect scan, never the teacher's raw
//! SYN scan (`scanners::syn_scanner`), which has no spec counterpart.

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::{
    error::{MasonError, Result},
    model::port_list::PortList,
    probes::tcp::TcpProbe,
};

/// Scans `target` over `ports`, returning the set of ports that accepted a
/// connection within `timeout`.
pub fn scan(target: Ipv4Addr, ports: PortList, timeout: Duration, max_workers: usize) -> Result<PortList> {
    let probe = TcpProbe::builder()
        .target(target)
        .ports(ports)
        .timeout(timeout)
        .max_workers(max_workers)
        .build()
        .map_err(|e| MasonError::Wire(e.to_string()))?;

    Ok(probe.probe())
}

#[cfg(test)]
#[path = "./portscan_tests.rs"]
mod tests;
