//! Probe primitives: ARP, ICMP echo, SNMP, TCP connect, traceroute (spec §4.3)
//!
//! Each probe is a single blocking call with an explicit response timeout;
//! none blocks indefinitely (spec §5 "Timeouts").

pub mod arp;
pub mod icmp;
pub mod snmp;
pub mod tcp;
pub mod traceroute;
