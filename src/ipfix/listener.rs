//! UDP listener: reads fixed-size datagrams and forwards them for decoding
//! (spec §4.8). Decoding itself runs in a worker pool the caller supplies,
//! keeping this module a thin, testable receive loop.

use log::{debug, warn};
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::error::{MasonError, Result};

/// How often the receive loop wakes up to check `cancelled` when no
/// datagram has arrived.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Binds a UDP socket at `bind_addr` and forwards each received datagram
/// (truncated to its actual length) to `sink`, until `cancelled` is set or
/// the receiving end of `sink` is dropped.
pub fn listen(bind_addr: SocketAddr, packet_size: usize, sink: Sender<Vec<u8>>, cancelled: &AtomicBool) -> Result<()> {
    let socket = UdpSocket::bind(bind_addr)
        .map_err(|e| MasonError::Wire(format!("failed to bind ipfix listener: {e}")))?;
    socket
        .set_read_timeout(Some(POLL_INTERVAL))
        .map_err(|e| MasonError::Wire(e.to_string()))?;

    debug!("ipfix listener bound to {bind_addr}");

    loop {
        if cancelled.load(Ordering::Relaxed) {
            return Ok(());
        }

        let mut buf = vec![0u8; packet_size];
        match socket.recv(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                if sink.send(buf).is_err() {
                    return Ok(());
                }
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(e) => {
                warn!("ipfix listener read error: {e}");
                return Err(MasonError::Wire(e.to_string()));
            }
        }
    }
}

#[cfg(test)]
#[path = "./listener_tests.rs"]
mod tests;
