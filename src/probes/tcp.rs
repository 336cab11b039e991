//! Bounded TCP connect-timeout port scan (spec §4.3 "TCP port scan")
//!
//! Grounded on the teacher's `lookup_pool` in `scanners/arp_scanner.rs`: a
//! bounded `ThreadPool` feeding results back over an `mpsc` channel. Swapped
//! from a DNS/vendor lookup pool to a `TcpStream::connect_timeout` pool,
//! since the spec's enrichment port scan is a plain connect scan, not the
//! teacher's raw SYN scan (`scanners/syn_scanner.rs`).

use derive_builder::Builder;
use log::debug;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream};
use std::sync::mpsc::channel;
use std::time::Duration;
use threadpool::ThreadPool;

use crate::model::port_list::PortList;

/// Probes a fixed list of ports on one target, `max_workers` connect
/// attempts in flight at a time.
#[derive(Builder)]
#[builder(setter(into))]
pub struct TcpProbe {
    target: Ipv4Addr,
    ports: PortList,
    #[builder(default = "Duration::from_secs(1)")]
    timeout: Duration,
    #[builder(default = "8")]
    max_workers: usize,
}

impl TcpProbe {
    /// Returns a builder for TcpProbe
    pub fn builder() -> TcpProbeBuilder {
        TcpProbeBuilder::default()
    }

    /// Attempts a connect to every configured port and returns the subset
    /// that accepted a connection within `timeout`.
    pub fn probe(&self) -> PortList {
        let workers = self.max_workers.max(1);
        let pool = ThreadPool::new(workers);
        let (tx, rx) = channel();
        let target = self.target;
        let timeout = self.timeout;

        let mut sent = 0;
        for &port in self.ports.iter() {
            let tx = tx.clone();
            sent += 1;
            pool.execute(move || {
                let addr = SocketAddr::new(IpAddr::V4(target), port);
                let open = TcpStream::connect_timeout(&addr, timeout).is_ok();
                // the receiver always outlives this closure's send since it
                // is only dropped after `sent` results have been collected
                let _ = tx.send((port, open));
            });
        }
        drop(tx);

        let mut open_ports = PortList::new();
        for _ in 0..sent {
            if let Ok((port, true)) = rx.recv() {
                open_ports.insert(port);
            }
        }

        debug!(
            "tcp port scan of {}: {}/{} open",
            target,
            open_ports.len(),
            sent
        );
        open_ports
    }
}

#[cfg(test)]
#[path = "./tcp_tests.rs"]
mod tests;
