//! Discovery: per-address probe scanner, per-network enumerator, rescan
//! filters, and interface bootstrap (spec §4.4).

pub mod bootstrap;
pub mod filters;
pub mod network_scan;
pub mod scanner;
