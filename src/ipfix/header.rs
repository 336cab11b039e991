//! IPFIX message header (spec §4.8): 16 bytes, big-endian.

use crate::error::{MasonError, Result};

/// Fixed size of the message header, in bytes.
pub const HEADER_LEN: usize = 16;
/// The only version this decoder accepts.
pub const IPFIX_VERSION: u16 = 10;

/// The 16-byte header every IPFIX message begins with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub version: u16,
    /// Total message length in octets, header included.
    pub length: u16,
    pub export_time: u32,
    pub sequence_number: u32,
    pub observation_domain_id: u32,
}

impl MessageHeader {
    /// Parses the header from the front of `buf`, rejecting anything but
    /// version 10.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(MasonError::IpfixParse(format!(
                "message too short for header: {} bytes",
                buf.len()
            )));
        }

        let version = u16::from_be_bytes([buf[0], buf[1]]);
        if version != IPFIX_VERSION {
            return Err(MasonError::IpfixParse(format!(
                "unsupported ipfix version: {version}"
            )));
        }

        Ok(Self {
            version,
            length: u16::from_be_bytes([buf[2], buf[3]]),
            export_time: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            sequence_number: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
            observation_domain_id: u32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]),
        })
    }
}

#[cfg(test)]
#[path = "./header_tests.rs"]
mod tests;
