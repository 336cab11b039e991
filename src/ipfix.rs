//! IPFIX (NetFlow v10) ingestion: wire codec and UDP listener (spec §4.8).
//!
//! Grounded on the teacher's hand-rolled binary packet builders
//! (`packet::arp_packet`, `packet::heartbeat_packet`): fixed-layout,
//! big-endian, field-by-field parse with no generic codec crate.

pub mod decoder;
pub mod header;
pub mod listener;
pub mod template;
