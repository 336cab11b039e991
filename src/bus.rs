//! Event bus: in-process publish/subscribe with bounded history and error
//! buffers (spec §4.2).
//!
//! Grounded on `term/src/events/manager.rs`'s single `mpsc::Receiver<Event>`
//! drain loop and `term/src/store/state.rs` + `reducer.rs`'s `VecDeque`-capped
//! `logs` ring (`MAX_LOGS`, `pop_front` on overflow). Generalized from one
//! fixed listener (the UI) to an arbitrary number of registered listeners,
//! and from a single ring to the spec's two (history + errors).

use log::warn;
use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, SendError, Sender, SyncSender, TrySendError, channel, sync_channel};
use std::sync::Mutex;

use crate::{
    error::{MasonError, Result},
    model::{
        addr::Addr,
        device::{Device, DiscoverySource},
        network::Network,
        prefix::Prefix,
    },
};

/// Priority bands from spec §4.2, used to filter low-priority event kinds
/// out of history retention via `MinimumPriorityLevel`.
pub mod priority {
    pub const DEVICE_UPDATED: u8 = 1;
    pub const DISCOVERED: u8 = 5;
    pub const ENRICH: u8 = 6;
    pub const PERF_PING_OR_SCAN: u8 = 10;
    pub const DISCOVERED_NETWORK: u8 = 11;
    pub const ADDED: u8 = 50;
}

/// Every event the orchestrator and its pools exchange over the bus.
#[derive(Debug, Clone)]
pub enum Event {
    /// A live host answered a probe; `snmp` is set when SNMP was the
    /// probe that found it.
    DeviceDiscovered {
        addr: Addr,
        mac: Option<crate::model::mac::Mac>,
        discovered_by: DiscoverySource,
        discovered_at: crate::model::timestamp::Timestamp,
        snmp: Option<crate::probes::snmp::SystemInfo>,
    },
    /// All configured probes reported no device at this address. Swallowed
    /// by the orchestrator, never a failure.
    NoDeviceDiscovered { addr: Addr },
    /// A device was newly inserted into the store.
    DeviceAdded { device: Device },
    /// An existing device's fields changed via merge.
    DeviceUpdated { device: Device },
    /// An SNMP interface walk (or bootstrap) found a prefix not yet in the
    /// network store.
    DiscoveredNetwork { prefix: Prefix },
    /// A network was newly inserted into the store.
    NetworkAdded { network: Network },
    /// Request to (re)scan one network's address space.
    ScanNetworkRequest { network: Network },
    /// Request to scan every network due for rescan.
    ScanAllNetworksRequest,
    /// Request to performance-ping every device due for a ping.
    PerfPingDevicesEvent,
    /// Request to run the default enrichment set against a device.
    EnrichDeviceRequest { device: Device },
    /// Background request to SNMP-walk a device's interface prefixes.
    DiscoverNetworksFromSnmpDevice { device: Device },
    /// Background request to SNMP-walk a device's ARP table.
    DiscoverDevicesFromSnmpDevice { device: Device },
    /// A non-fatal operational error worth surfacing to listeners.
    Error { source: String, message: String },
    /// The bus is shutting down; no further events will be published.
    Done,
}

impl Event {
    /// Priority band used by `MinimumPriorityLevel` history filtering
    /// (spec §4.2).
    pub fn priority(&self) -> u8 {
        match self {
            Event::DeviceUpdated { .. } => priority::DEVICE_UPDATED,
            Event::DeviceDiscovered { .. } => priority::DISCOVERED,
            Event::EnrichDeviceRequest { .. } => priority::ENRICH,
            Event::PerfPingDevicesEvent
            | Event::ScanNetworkRequest { .. }
            | Event::ScanAllNetworksRequest => priority::PERF_PING_OR_SCAN,
            Event::DiscoveredNetwork { .. } => priority::DISCOVERED_NETWORK,
            Event::DeviceAdded { .. } | Event::NetworkAdded { .. } => priority::ADDED,
            _ => 0,
        }
    }

    /// True for events that belong in the error ring rather than history.
    pub fn is_error(&self) -> bool {
        matches!(self, Event::Error { .. })
    }
}

struct Rings {
    history: VecDeque<Event>,
    history_cap: usize,
    errors: VecDeque<Event>,
    errors_cap: usize,
}

/// In-process pub/sub with bounded inbound buffering, history, and error
/// ring buffers.
pub struct EventBus {
    inbound_tx: SyncSender<Event>,
    inbound_rx: Mutex<Option<Receiver<Event>>>,
    listeners: Mutex<Vec<Sender<Event>>>,
    rings: Mutex<Rings>,
    min_priority: u8,
}

impl EventBus {
    /// Builds a bus whose inbound buffer holds up to `inbound_capacity`
    /// events before publishing starts dropping (spec §4.2: "shed, never
    /// block the publisher"), retaining up to `history_capacity` events in
    /// `history()` (filtered to `min_priority` and above) and up to
    /// `errors_capacity` events in `errors()`.
    pub fn new(
        inbound_capacity: usize,
        history_capacity: usize,
        errors_capacity: usize,
        min_priority: u8,
    ) -> Self {
        let (tx, rx) = sync_channel(inbound_capacity.max(1));
        Self {
            inbound_tx: tx,
            inbound_rx: Mutex::new(Some(rx)),
            listeners: Mutex::new(Vec::new()),
            rings: Mutex::new(Rings {
                history: VecDeque::with_capacity(history_capacity),
                history_cap: history_capacity.max(1),
                errors: VecDeque::with_capacity(errors_capacity),
                errors_cap: errors_capacity.max(1),
            }),
            min_priority,
        }
    }

    /// Registers a new listener, returning the channel every subsequent
    /// `publish` will be delivered on.
    pub fn add_listener(&self) -> Result<Receiver<Event>> {
        let (tx, rx) = channel();
        self.listeners.lock()?.push(tx);
        Ok(rx)
    }

    /// Enqueues `event` on the bounded inbound buffer. If the buffer is
    /// full the event is dropped with a warning rather than blocking the
    /// publisher (spec §4.2: "shed, never block"). Only a closed inbound
    /// channel (the bus's `run` loop has exited) is reported as an error.
    pub fn publish(&self, event: Event) -> Result<()> {
        match self.inbound_tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(dropped)) => {
                warn!("event bus inbound buffer full, dropping event: {dropped:?}");
                Ok(())
            }
            Err(TrySendError::Disconnected(dropped)) => {
                Err(MasonError::from_bus_send_error(SendError(dropped)))
            }
        }
    }

    /// Drains the inbound buffer sequentially until the channel is closed
    /// (every publisher handle, including this bus's own, dropped):
    /// appends each event to history (or the error ring), then fans it out
    /// to every listener in registration order. Fan-out is blocking per
    /// listener (spec §4.2: "a slow listener applies back-pressure across
    /// all listeners").
    pub fn run(&self) -> Result<()> {
        let rx = self
            .inbound_rx
            .lock()?
            .take()
            .ok_or_else(|| MasonError::Lock("event bus already running".into()))?;

        for event in rx.iter() {
            self.record(&event);
            let listeners = self.listeners.lock()?;
            for listener in listeners.iter() {
                let _ = listener.send(event.clone());
            }
        }

        Ok(())
    }

    fn record(&self, event: &Event) {
        let Ok(mut rings) = self.rings.lock() else {
            return;
        };

        if event.is_error() {
            if rings.errors.len() == rings.errors_cap {
                rings.errors.pop_front();
            }
            rings.errors.push_back(event.clone());
            return;
        }

        if event.priority() >= self.min_priority {
            if rings.history.len() == rings.history_cap {
                rings.history.pop_front();
            }
            rings.history.push_back(event.clone());
        }
    }

    /// A clone of the current history ring, oldest first.
    pub fn history(&self) -> Result<Vec<Event>> {
        Ok(self.rings.lock()?.history.iter().cloned().collect())
    }

    /// A clone of the current error ring, oldest first.
    pub fn errors(&self) -> Result<Vec<Event>> {
        Ok(self.rings.lock()?.errors.iter().cloned().collect())
    }
}

#[cfg(test)]
#[path = "./bus_tests.rs"]
mod tests;
