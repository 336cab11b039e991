//! Custom Error and Result types for this crate

use std::{
    any::Any,
    net::AddrParseError,
    num::ParseIntError,
    sync::{
        MutexGuard, PoisonError,
        mpsc::{RecvError, SendError},
    },
};
use thiserror::Error;

use crate::{bus::Event, probes::arp::ArpProbeBuilderError};

/// Custom Error type for this crate
#[derive(Error, Debug)]
pub enum MasonError {
    /// Error coming directly off the wire
    #[error("wire error: {0}")]
    Wire(String),

    /// Error resulting from a malformed IPFIX datagram; the caller should
    /// discard the packet and continue, never panic
    #[error("ipfix parse error: {0}")]
    IpfixParse(String),

    /// Errors resulting from the event bus's internal channel
    #[error("failed to send event: {0:?}")]
    BusSendError(#[from] SendError<Box<Event>>),

    /// Error obtaining lock on a shared resource (packet reader/sender,
    /// template cache, etc)
    #[error("failed to get lock on shared resource: {0}")]
    Lock(String),

    /// Generic thread join / panic error
    #[error("thread error: {0}")]
    ThreadError(String),

    /// Errors when consuming messages from channels
    #[error("failed to receive message from channel: {0:?}")]
    ChannelReceive(#[from] RecvError),

    /// Error generated during ARP probe construction
    #[error("failed to build arp probe: {0}")]
    ArpProbeBuild(#[from] ArpProbeBuilderError),

    /// A probe reported that the remote host did not answer within its
    /// timeout. Not a system-level error; callers chain to the next probe.
    #[error("no response from remote: {0}")]
    NoResponseFromRemote(String),

    /// The remote host actively refused the connection (e.g. SNMP port
    /// closed). Not a system-level error.
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    /// A probe received a response with no usable payload.
    #[error("empty response from: {0}")]
    EmptyResponse(String),

    /// A network scan was requested for an IPv6 prefix; IPv6 sweeping is
    /// out of scope. Informational, not a failure.
    #[error("ipv6 excluded from discovery: {0}")]
    Ipv6ExcludedFromDiscovery(String),

    /// Errors surfaced by a `Store` implementation
    #[error("store error: {0}")]
    Store(String),

    /// Attempted to add a network whose prefix already exists
    #[error("network already exists: {0}")]
    NetworkExists(String),

    /// Attempted to add a device whose address already exists
    #[error("device already exists: {0}")]
    DeviceExists(String),

    /// Wrapping errors related to probing/scanning a specific target
    #[error("scan error: {error} - addr: {addr:?}, port: {port:?}")]
    Scan {
        /// The error message encountered
        error: String,
        /// The associated address being scanned, if any
        addr: Option<String>,
        /// The associated port being scanned, if any
        port: Option<String>,
    },
}

impl From<Box<dyn Any + Send>> for MasonError {
    fn from(value: Box<dyn Any + Send>) -> Self {
        if let Some(s) = value.downcast_ref::<&'static str>() {
            Self::ThreadError(format!("thread panicked with: {}", s))
        } else if let Some(s) = value.downcast_ref::<String>() {
            Self::ThreadError(format!("thread panicked with: {}", s))
        } else {
            Self::ThreadError("thread panicked with an unknown type".into())
        }
    }
}

impl<'a, T: ?Sized> From<PoisonError<MutexGuard<'a, T>>> for MasonError {
    fn from(value: PoisonError<MutexGuard<'a, T>>) -> Self {
        Self::Lock(value.to_string())
    }
}

impl MasonError {
    /// Converter for std::net::AddrParseError
    pub fn from_addr_parse_error(addr: &str, error: AddrParseError) -> Self {
        Self::Scan {
            error: error.to_string(),
            addr: Some(addr.to_string()),
            port: None,
        }
    }

    /// Converter for ipnet::AddrParseError
    pub fn from_ipnet_parse_error(
        addr: &str,
        error: ipnet::AddrParseError,
    ) -> Self {
        Self::Scan {
            error: error.to_string(),
            addr: Some(addr.to_string()),
            port: None,
        }
    }

    /// Converter for ParseIntError encountered while parsing a port target
    pub fn from_port_parse_int_err(port: &str, error: ParseIntError) -> Self {
        Self::Scan {
            error: error.to_string(),
            addr: None,
            port: Some(port.to_string()),
        }
    }

    /// Converter for channel send errors carrying an `Event`
    pub fn from_bus_send_error(e: SendError<Event>) -> Self {
        MasonError::BusSendError(SendError(Box::from(e.0)))
    }

    /// Classifies a raw SNMP/transport error message into the taxonomy
    /// described in spec §4.3: "request timeout" -> NoResponseFromRemote,
    /// "connection refused" -> ConnectionRefused, anything else -> wrapped
    pub fn from_transport_message(target: &str, message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("timeout") || lower.contains("timed out") {
            Self::NoResponseFromRemote(target.to_string())
        } else if lower.contains("connection refused") {
            Self::ConnectionRefused(target.to_string())
        } else {
            Self::Scan {
                error: message.to_string(),
                addr: Some(target.to_string()),
                port: None,
            }
        }
    }
}

/// Custom Result type for this crate. All Errors exposed by this crate will
/// be returned as [`MasonError`]
pub type Result<T> = std::result::Result<T, MasonError>;
