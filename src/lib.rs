//! Mason: a local-network discovery and monitoring orchestration engine.
//!
//! Continuously discovers devices and networks on the LAN via ARP, ICMP,
//! and SNMP probes, enriches them (reverse DNS, OUI, open ports), tracks
//! performance over time, and ingests IPFIX flow records -- all dispatched
//! through a small set of bounded worker pools and fanned out over a
//! single in-process event bus.

#![deny(missing_docs)]
pub mod bus;
pub mod config;
pub mod discovery;
pub mod enrichment;
pub mod error;
pub mod ipfix;
pub mod model;
pub mod network;
pub mod orchestrator;
pub mod packet;
pub mod pinger;
pub mod pool;
pub mod probes;
pub mod store;
