//! Traceroute4 probe (spec §4.3 "Traceroute4")
//!
//! Grounded on `icmp.rs`'s echo request/reply packet shape, varying the IP
//! TTL per hop the way the teacher's `packet/heartbeat_packet.rs` pokes
//! fields directly into a hand-built IP header -- here via the socket's
//! `IP_TTL` option instead, since hops are sent through a connectionless
//! socket rather than a raw ethernet frame.

use derive_builder::Builder;
use log::debug;
use pnet::packet::Packet;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{IcmpPacket, IcmpTypes, checksum};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use crate::{
    error::{MasonError, Result},
    model::addr::Addr,
};

const PAYLOAD_LEN: usize = 32;
const PACKET_LEN: usize = 8 + PAYLOAD_LEN;

/// One hop's result: the router (or destination) that answered, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct HopStat {
    pub ttl: u8,
    pub peer: Option<Addr>,
    pub rtt: Option<Duration>,
    pub is_destination: bool,
}

/// Sends TTL-incrementing ICMP echoes to `target` until it answers or
/// `max_hops` is exhausted.
#[derive(Builder)]
#[builder(setter(into))]
pub struct TracerouteProbe {
    target: Ipv4Addr,
    #[builder(default = "false")]
    privileged: bool,
    #[builder(default = "30")]
    max_hops: u8,
    #[builder(default = "Duration::from_secs(1)")]
    timeout: Duration,
}

impl TracerouteProbe {
    /// Returns a builder for TracerouteProbe
    pub fn builder() -> TracerouteProbeBuilder {
        TracerouteProbeBuilder::default()
    }

    fn open_socket(&self) -> Result<UdpSocket> {
        let sock_type = if self.privileged {
            Type::RAW
        } else {
            Type::DGRAM
        };

        let socket = Socket::new(Domain::IPV4, sock_type, Some(Protocol::ICMPV4))
            .map_err(|e| MasonError::Wire(format!("failed to open icmp socket: {e}")))?;
        socket
            .set_read_timeout(Some(self.timeout))
            .map_err(|e| MasonError::Wire(e.to_string()))?;
        socket
            .bind(&SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0).into())
            .map_err(|e| MasonError::Wire(format!("failed to bind icmp socket: {e}")))?;

        Ok(socket.into())
    }

    fn build_echo(identifier: u16, ttl: u8) -> [u8; PACKET_LEN] {
        let mut buf = [0u8; PACKET_LEN];
        let mut request =
            MutableEchoRequestPacket::new(&mut buf).expect("buffer sized for echo request");

        request.set_icmp_type(IcmpTypes::EchoRequest);
        request.set_identifier(identifier);
        request.set_sequence_number(ttl as u16);
        request.set_payload(&[0u8; PAYLOAD_LEN]);

        let csum = checksum(&IcmpPacket::new(request.packet()).expect("packet just built"));
        request.set_checksum(csum);
        buf
    }

    /// Probes one hop at the given TTL, returning the replying peer (router
    /// or destination) if any response arrived within `timeout`.
    fn probe_hop(&self, socket: &UdpSocket, identifier: u16, ttl: u8) -> HopStat {
        if socket.set_ttl(ttl as u32).is_err() {
            return HopStat {
                ttl,
                peer: None,
                rtt: None,
                is_destination: false,
            };
        }

        let request = Self::build_echo(identifier, ttl);
        let dest = SocketAddr::new(IpAddr::V4(self.target), 0);
        let sent_at = Instant::now();

        if socket.send_to(&request, dest).is_err() {
            return HopStat {
                ttl,
                peer: None,
                rtt: None,
                is_destination: false,
            };
        }

        let mut buf = [0u8; 512];
        match socket.recv_from(&mut buf) {
            Ok((n, from)) => {
                let rtt = sent_at.elapsed();
                let is_destination = matches!(
                    IcmpPacket::new(&buf[..n]).map(|p| p.get_icmp_type()),
                    Some(IcmpTypes::EchoReply)
                ) || from.ip() == IpAddr::V4(self.target);

                HopStat {
                    ttl,
                    peer: Some(Addr::from(from.ip())),
                    rtt: Some(rtt),
                    is_destination,
                }
            }
            Err(_) => HopStat {
                ttl,
                peer: None,
                rtt: None,
                is_destination: false,
            },
        }
    }

    /// Runs the traceroute, returning one [`HopStat`] per hop tried, up to
    /// and including the hop that reached the destination.
    pub fn probe(&self) -> Result<Vec<HopStat>> {
        let socket = self.open_socket()?;
        let identifier = std::process::id() as u16;
        let mut hops = Vec::new();

        for ttl in 1..=self.max_hops {
            let hop = self.probe_hop(&socket, identifier, ttl);
            let reached = hop.is_destination;
            debug!("traceroute {} hop {}: {:?}", self.target, ttl, hop.peer);
            hops.push(hop);
            if reached {
                break;
            }
        }

        Ok(hops)
    }
}

#[cfg(test)]
#[path = "./traceroute_tests.rs"]
mod tests;
