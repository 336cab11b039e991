//! Set walking and data-record decoding into `IpFlow` (spec §4.8).

use crate::error::{MasonError, Result};
use crate::model::{addr::Addr, flow::{IpFlow, TcpFlags}, timestamp::Timestamp};
use crate::ipfix::header::MessageHeader;
use crate::ipfix::template::{Template, TemplateCache, parse_template_set};

const SET_HEADER_LEN: usize = 4;
const SET_ID_TEMPLATE: u16 = 2;
const SET_ID_OPTIONS_TEMPLATE: u16 = 3;
const SET_ID_DATA_MIN: u16 = 256;

const IE_OCTET_DELTA_COUNT: u16 = 1;
const IE_PACKET_DELTA_COUNT: u16 = 2;
const IE_PROTOCOL_IDENTIFIER: u16 = 4;
const IE_TCP_CONTROL_BITS: u16 = 6;
const IE_SOURCE_TRANSPORT_PORT: u16 = 7;
const IE_SOURCE_IPV4_ADDRESS: u16 = 8;
const IE_DESTINATION_TRANSPORT_PORT: u16 = 11;
const IE_DESTINATION_IPV4_ADDRESS: u16 = 12;
const IE_FLOW_START_NANOSECONDS: u16 = 156;
const IE_FLOW_END_NANOSECONDS: u16 = 157;

/// Seconds between the NTP epoch (1900-01-01) and the Unix epoch
/// (1970-01-01), used to convert `flowStart/EndNanoseconds`.
const NTP_TO_UNIX_EPOCH_SECS: u64 = 2_208_988_800;

/// Decodes one full IPFIX message (header plus every set), updating
/// `cache` with any templates seen and returning every flow decoded out of
/// data sets referencing a known template. A data set whose template
/// hasn't been seen is skipped (not an error): the exporter may have sent
/// the template in an earlier, already-processed datagram, or -- per spec
/// §9's open question -- a template for another stream.
pub fn decode_message(buf: &[u8], cache: &TemplateCache) -> Result<Vec<IpFlow>> {
    let header = MessageHeader::parse(buf)?;
    let mut flows = Vec::new();
    let mut offset = crate::ipfix::header::HEADER_LEN;

    while offset + SET_HEADER_LEN <= buf.len() {
        let set_id = u16::from_be_bytes([buf[offset], buf[offset + 1]]);
        let set_length = u16::from_be_bytes([buf[offset + 2], buf[offset + 3]]) as usize;

        if set_length < SET_HEADER_LEN || offset + set_length > buf.len() {
            return Err(MasonError::IpfixParse(format!(
                "set at offset {offset} has invalid length {set_length}"
            )));
        }

        let body = &buf[offset + SET_HEADER_LEN..offset + set_length];

        match set_id {
            SET_ID_TEMPLATE => {
                for template in parse_template_set(body)? {
                    cache.insert(header.observation_domain_id, template)?;
                }
            }
            SET_ID_OPTIONS_TEMPLATE => {
                // Options templates carry exporter metadata the spec
                // doesn't map to any field on `IpFlow`; ignored per spec
                // §4.8.
            }
            id if id >= SET_ID_DATA_MIN => {
                if let Some(template) = cache.get(header.observation_domain_id, id)? {
                    flows.extend(decode_data_set(body, &template)?);
                }
            }
            other => {
                return Err(MasonError::IpfixParse(format!(
                    "unrecognized set id: {other}"
                )));
            }
        }

        offset += set_length;
    }

    Ok(flows)
}

fn decode_data_set(body: &[u8], template: &Template) -> Result<Vec<IpFlow>> {
    let record_len: usize = template.fields.iter().map(|f| f.field_length as usize).sum();
    if record_len == 0 {
        return Ok(Vec::new());
    }

    let mut flows = Vec::new();
    let mut offset = 0;
    while offset + record_len <= body.len() {
        flows.push(decode_record(&body[offset..offset + record_len], template));
        offset += record_len;
    }

    Ok(flows)
}

fn decode_record(record: &[u8], template: &Template) -> IpFlow {
    let mut flow = IpFlow {
        src_addr: Addr::default(),
        src_port: 0,
        src_asn: None,
        dst_addr: Addr::default(),
        dst_port: 0,
        dst_asn: None,
        start: Timestamp::ZERO,
        end: Timestamp::ZERO,
        bytes: 0,
        packets: 0,
        protocol: 0,
        tcp_flags: TcpFlags::default(),
    };

    let mut offset = 0;
    for field in &template.fields {
        let len = field.field_length as usize;
        if offset + len > record.len() {
            break;
        }
        let value = &record[offset..offset + len];

        match field.information_element_id {
            IE_OCTET_DELTA_COUNT => flow.bytes = read_uint(value),
            IE_PACKET_DELTA_COUNT => flow.packets = read_uint(value),
            IE_PROTOCOL_IDENTIFIER => flow.protocol = value.first().copied().unwrap_or(0),
            IE_TCP_CONTROL_BITS => flow.tcp_flags = TcpFlags(read_uint(value) as u16),
            IE_SOURCE_TRANSPORT_PORT => flow.src_port = read_uint(value) as u16,
            IE_SOURCE_IPV4_ADDRESS => {
                if let Some(addr) = read_ipv4(value) {
                    flow.src_addr = addr;
                }
            }
            IE_DESTINATION_TRANSPORT_PORT => flow.dst_port = read_uint(value) as u16,
            IE_DESTINATION_IPV4_ADDRESS => {
                if let Some(addr) = read_ipv4(value) {
                    flow.dst_addr = addr;
                }
            }
            IE_FLOW_START_NANOSECONDS => flow.start = read_ntp_timestamp(value),
            IE_FLOW_END_NANOSECONDS => flow.end = read_ntp_timestamp(value),
            _ => {} // unknown IE: length already honored above, so offset stays correct
        }

        offset += len;
    }

    flow
}

fn read_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64)
}

fn read_ipv4(bytes: &[u8]) -> Option<Addr> {
    if bytes.len() != 4 {
        return None;
    }
    Some(Addr::from_v4(std::net::Ipv4Addr::new(
        bytes[0], bytes[1], bytes[2], bytes[3],
    )))
}

fn read_ntp_timestamp(bytes: &[u8]) -> Timestamp {
    if bytes.len() != 8 {
        return Timestamp::ZERO;
    }
    let seconds_since_1900 = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64;
    Timestamp::from_secs(seconds_since_1900.saturating_sub(NTP_TO_UNIX_EPOCH_SECS))
}

#[cfg(test)]
#[path = "./decoder_tests.rs"]
mod tests;
