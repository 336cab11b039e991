//! ICMP4 echo probe (spec §4.3 "ICMP4 Echo")
//!
//! No teacher file covers raw ICMP directly; grounded on the same
//! send/read-loop shape as `arp.rs`, adapted to layer-3 echo request/reply
//! instead of a layer-2 ARP exchange, with the privileged/unprivileged
//! socket split built on `socket2` (the corpus's standard tool for this
//! exact raw-vs-datagram-ICMP distinction).

use derive_builder::Builder;
use log::debug;
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{IcmpPacket, IcmpTypes, checksum};
use pnet::packet::ipv4::Ipv4Packet;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use crate::{
    error::{MasonError, Result},
    model::{addr::Addr, timestamp::Timestamp},
};

const ECHO_HEADER_LEN: usize = 8;
const PAYLOAD_LEN: usize = 32;
const PACKET_LEN: usize = ECHO_HEADER_LEN + PAYLOAD_LEN;

/// Per-probe statistics, computed over all replies received within
/// `timeout` for each of `count` echoes (spec §4.3).
#[derive(Debug, Clone, PartialEq)]
pub struct IcmpStats {
    /// Number of echoes that received a reply.
    pub success_count: u32,
    /// Fraction of echoes that went unanswered, `0.0..=1.0`.
    pub packet_loss: f64,
    /// Fastest round-trip time among successful replies.
    pub minimum: Duration,
    /// Mean round-trip time among successful replies.
    pub mean: Duration,
    /// Slowest round-trip time among successful replies.
    pub maximum: Duration,
    /// Standard deviation of round-trip times among successful replies.
    pub std_dev: Duration,
    /// Wall-clock time spent sending and awaiting all echoes.
    pub total_elapsed: Duration,
    /// When the first echo of this round was sent.
    pub start: Timestamp,
    /// The address probed.
    pub peer: Addr,
}

/// Sends `count` ICMP echo requests to `target`, optionally sleeping
/// `between` in between, waiting up to `timeout` for each reply.
#[derive(Builder)]
#[builder(setter(into))]
pub struct IcmpProbe {
    target: Ipv4Addr,
    /// Raw socket (requires CAP_NET_RAW) vs OS-provided ICMP datagram socket
    #[builder(default = "false")]
    privileged: bool,
    #[builder(default = "1")]
    count: u32,
    #[builder(default = "Duration::from_secs(2)")]
    timeout: Duration,
    #[builder(default = "None")]
    between: Option<Duration>,
}

impl IcmpProbe {
    /// Returns a builder for IcmpProbe
    pub fn builder() -> IcmpProbeBuilder {
        IcmpProbeBuilder::default()
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
            .set_write_timeout(Some(self.timeout))
            .map_err(|e| MasonError::Wire(e.to_string()))?;
        socket
            .connect(&SocketAddr::new(IpAddr::V4(self.target), 0).into())
            .map_err(|e| MasonError::Wire(format!("failed to connect icmp socket: {e}")))?;

        Ok(socket.into())
    }

    fn build_echo(&self, identifier: u16, sequence: u16) -> [u8; PACKET_LEN] {
        let mut buf = [0u8; PACKET_LEN];
        let mut request =
            MutableEchoRequestPacket::new(&mut buf).expect("buffer sized for echo request");

        request.set_icmp_type(IcmpTypes::EchoRequest);
        request.set_identifier(identifier);
        request.set_sequence_number(sequence);
        request.set_payload(&[0u8; PAYLOAD_LEN]);

        let csum = checksum(&IcmpPacket::new(request.packet()).expect("packet just built"));
        request.set_checksum(csum);

        buf
    }

    /// Parses a reply buffer, stripping the IPv4 header a raw socket
    /// prepends (an unprivileged datagram socket never sees one), and
    /// returns the echo identifier/sequence if this is an echo reply.
    fn parse_reply(&self, buf: &[u8]) -> Option<(u16, u16)> {
        let icmp_bytes = if self.privileged {
            Ipv4Packet::new(buf)?.payload().to_vec()
        } else {
            buf.to_vec()
        };

        let icmp = IcmpPacket::new(&icmp_bytes)?;
        if icmp.get_icmp_type() != IcmpTypes::EchoReply {
            return None;
        }

        let reply = EchoReplyPacket::new(&icmp_bytes)?;
        Some((reply.get_identifier(), reply.get_sequence_number()))
    }

    /// Runs the configured number of echoes and returns the computed
    /// statistics. Never returns `Err` purely because some echoes were
    /// unanswered -- `success_count == 0` communicates that case, matching
    /// the discovery scanner's "no device" short-circuit (spec §4.4).
    pub fn probe(&self) -> Result<IcmpStats> {
        let socket = self.open_socket()?;
        let identifier = std::process::id() as u16;
        let start = Timestamp::now();
        let probe_start = Instant::now();
        let mut rtts: Vec<Duration> = Vec::with_capacity(self.count as usize);

        for seq in 0..self.count as u16 {
            let request = self.build_echo(identifier, seq);
            let sent_at = Instant::now();

            if socket.send(&request).is_err() {
                continue;
            }

            let mut buf = [0u8; 512];
            loop {
                match socket.recv(&mut buf) {
                    Ok(n) => match self.parse_reply(&buf[..n]) {
                        Some((id, sq)) if id == identifier && sq == seq => {
                            rtts.push(sent_at.elapsed());
                            break;
                        }
                        _ => {
                            if sent_at.elapsed() >= self.timeout {
                                break;
                            }
                            continue;
                        }
                    },
                    Err(_) => break,
                }
            }

            if let Some(between) = self.between {
                std::thread::sleep(between);
            }
        }

        debug!(
            "icmp probe of {}: {}/{} replies",
            self.target,
            rtts.len(),
            self.count
        );

        Ok(stats_from_rtts(self.target, start, probe_start, self.count, rtts))
    }
}

fn stats_from_rtts(
    target: Ipv4Addr,
    start: Timestamp,
    probe_start: Instant,
    sent: u32,
    rtts: Vec<Duration>,
) -> IcmpStats {
    let success_count = rtts.len() as u32;
    let packet_loss = if sent == 0 {
        0.0
    } else {
        100.0 * (1.0 - success_count as f64 / sent as f64)
    };

    if rtts.is_empty() {
        return IcmpStats {
            success_count: 0,
            packet_loss,
            minimum: Duration::ZERO,
            mean: Duration::ZERO,
            maximum: Duration::ZERO,
            std_dev: Duration::ZERO,
            total_elapsed: probe_start.elapsed(),
            start,
            peer: Addr::from_v4(target),
        };
    }

    let minimum = *rtts.iter().min().expect("non-empty");
    let maximum = *rtts.iter().max().expect("non-empty");
    let mean_nanos = rtts.iter().map(|d| d.as_nanos()).sum::<u128>() / rtts.len() as u128;
    let mean = Duration::from_nanos(mean_nanos as u64);

    let variance_nanos = rtts
        .iter()
        .map(|d| {
            let diff = d.as_nanos() as i128 - mean_nanos as i128;
            (diff * diff) as u128
        })
        .sum::<u128>()
        / rtts.len() as u128;
    let std_dev = Duration::from_nanos((variance_nanos as f64).sqrt() as u64);

    IcmpStats {
        success_count,
        packet_loss,
        minimum,
        mean,
        maximum,
        std_dev,
        total_elapsed: probe_start.elapsed(),
        start,
        peer: Addr::from_v4(target),
    }
}

#[cfg(test)]
#[path = "./icmp_tests.rs"]
mod tests;
