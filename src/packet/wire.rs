//! Implements a default Wire using pnet
//!
//! Grounded on the teacher's `wire.rs` (`Wire(Sender, Reader)` tuple,
//! `PNetReader`/`PNetSender`), adapted to the crate's own [`Interface`] type
//! and to classify read timeouts as [`MasonError::NoResponseFromRemote`]
//! rather than a generic wire error, since probes (§4.3) need to
//! distinguish "no reply" from a transport failure.

use pnet::datalink;
use std::{
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{
    error::{MasonError, Result},
    network::Interface,
    packet::{Reader, Sender},
};

/// A packet Reader and packet Sender pair bound to one interface.
#[derive(Clone)]
pub struct Wire(pub Arc<Mutex<dyn Sender>>, pub Arc<Mutex<dyn Reader>>);

/// A PNet implementation of packet Reader
pub struct PNetReader {
    receiver: Box<dyn datalink::DataLinkReceiver>,
}

impl Reader for PNetReader {
    fn next_packet(&mut self) -> Result<&[u8]> {
        self.receiver.next().map_err(|e| match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                MasonError::NoResponseFromRemote("read timeout".into())
            }
            _ => MasonError::Wire(e.to_string()),
        })
    }
}

/// A PNet implementation of packet Sender
pub struct PNetSender {
    sender: Box<dyn datalink::DataLinkSender>,
}

impl Sender for PNetSender {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        match self.sender.send_to(packet, None) {
            Some(res) => res.map_err(|e| MasonError::Wire(e.to_string())),
            None => Err(MasonError::Wire("failed to send packet".into())),
        }
    }
}

/// Opens a wire on `interface`, optionally bounding each blocking read by
/// `read_timeout` (probes rely on this to turn an unanswered request into a
/// `NoResponseFromRemote` instead of hanging forever).
pub fn open(interface: &Interface, read_timeout: Option<Duration>) -> Result<Wire> {
    let mut cfg = datalink::Config::default();
    cfg.read_timeout = read_timeout;

    let channel = match datalink::channel(&interface.into(), cfg) {
        Ok(datalink::Channel::Ethernet(tx, rx)) => Ok((tx, rx)),
        Ok(_) => Err(MasonError::Wire("failed to create packet reader".into())),
        Err(e) => Err(MasonError::Wire(e.to_string())),
    }?;

    Ok(Wire(
        Arc::new(Mutex::new(PNetSender { sender: channel.0 })),
        Arc::new(Mutex::new(PNetReader { receiver: channel.1 })),
    ))
}

/// Returns the default wire for an interface, with no read timeout.
pub fn default(interface: &Interface) -> Result<Wire> {
    open(interface, None)
}

#[cfg(test)]
#[path = "./wire_tests.rs"]
mod tests;
