//! IPFIX flow record and related types (spec §3, §4.8)

use serde::{Deserialize, Serialize};

use crate::model::{addr::Addr, timestamp::Timestamp};

/// TCP control-bit flags (spec §3: "bitfield FIN/SYN/RST/PSH/ACK/URG").
/// Mirrors the raw `tcpControlBits` IPFIX field (IE 6) bit-for-bit rather
/// than reordering, so the decoder can store it without reinterpretation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpFlags(pub u16);

impl TcpFlags {
    pub const FIN: u16 = 0x01;
    pub const SYN: u16 = 0x02;
    pub const RST: u16 = 0x04;
    pub const PSH: u16 = 0x08;
    pub const ACK: u16 = 0x10;
    pub const URG: u16 = 0x20;

    /// Returns true if the given bit(s) are set
    pub fn has(&self, bits: u16) -> bool {
        self.0 & bits == bits
    }
}

/// One-sided summary of packets matching a 5-tuple over a time window
/// (spec §3, §4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpFlow {
    pub src_addr: Addr,
    pub src_port: u16,
    pub src_asn: Option<String>,
    pub dst_addr: Addr,
    pub dst_port: u16,
    pub dst_asn: Option<String>,
    pub start: Timestamp,
    pub end: Timestamp,
    pub bytes: u64,
    pub packets: u64,
    /// IANA protocol number (e.g. 6 = TCP, 17 = UDP)
    pub protocol: u8,
    pub tcp_flags: TcpFlags,
}

impl IpFlow {
    /// IANA protocol number for TCP
    pub const PROTO_TCP: u8 = 6;
    /// IANA protocol number for UDP
    pub const PROTO_UDP: u8 = 17;
}

#[cfg(test)]
#[path = "./flow_tests.rs"]
mod tests;
