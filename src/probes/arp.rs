//! ARP request/reply probe (spec §4.3 "ARP")
//!
//! Grounded on the teacher's `scanners/arp_scanner.rs`: the same broadcast
//! ARP request built via `packet::arp_packet::ArpPacketBuilder`, the same
//! "only a Reply counts" filter. Narrowed from a continuous multi-target
//! scanner into a single blocking call per target, since the spec frames
//! ARP as a primitive invoked by the discovery scanner rather than a
//! free-running scan loop.

use derive_builder::Builder;
use log::debug;
use pnet::packet::{Packet, arp, ethernet};
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use crate::{
    error::{MasonError, Result},
    model::{addr::Addr, mac::Mac},
    network::Interface,
    packet::{arp_packet::ArpPacketBuilder, wire},
};

/// Issues ARP requests and waits for a matching reply. Requires raw-socket
/// capability on `interface`.
#[derive(Builder)]
#[builder(setter(into))]
pub struct ArpProbe<'net> {
    /// Interface to send the request on and listen for replies
    interface: &'net Interface,
    /// How long to wait for a matching reply before failing with
    /// `NoResponseFromRemote`
    timeout: Duration,
}

impl<'net> ArpProbe<'net> {
    /// Returns a builder for ArpProbe
    pub fn builder() -> ArpProbeBuilder<'net> {
        ArpProbeBuilder::default()
    }

    /// Issues an ARP request for `target` on this probe's interface and
    /// waits up to `timeout` for a matching reply, returning `{Addr, MAC}`.
    pub fn probe(&self, target: Ipv4Addr) -> Result<(Addr, Mac)> {
        let wire = wire::open(self.interface, Some(self.timeout))?;

        let request = ArpPacketBuilder::default()
            .source_ip(self.interface.ipv4)
            .source_mac(self.interface.mac)
            .dest_ip(target)
            .build()
            .map_err(|e| MasonError::Wire(e.to_string()))?;

        {
            let mut sender = wire.0.lock()?;
            sender.send(&request.to_raw())?;
        }

        debug!("awaiting arp reply from {}", target);
        let deadline = Instant::now() + self.timeout;
        let mut reader = wire.1.lock()?;

        loop {
            if Instant::now() >= deadline {
                return Err(MasonError::NoResponseFromRemote(target.to_string()));
            }

            let pkt = reader.next_packet()?;

            let Some(eth) = ethernet::EthernetPacket::new(pkt) else {
                continue;
            };
            let Some(header) = arp::ArpPacket::new(eth.payload()) else {
                continue;
            };

            if header.get_operation() != arp::ArpOperations::Reply {
                continue;
            }

            if header.get_sender_proto_addr() != target {
                continue;
            }

            let mac = Mac::from(eth.get_source());
            debug!("arp reply from {}: {}", target, mac);
            return Ok((Addr::from_v4(target), mac));
        }
    }
}

#[cfg(test)]
#[path = "./arp_tests.rs"]
mod tests;
