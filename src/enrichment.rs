//! Enrichment: reverse DNS, OUI vendor lookup, TCP port scan, and SNMP
//! walks applied to a newly added or rescanned device (spec §4.5).

pub mod dns;
pub mod filters;
pub mod oui;
pub mod portscan;
pub mod snmp_walk;
