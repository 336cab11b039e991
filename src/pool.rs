//! Generic bounded-concurrency worker pool (spec §4.1).
//!
//! Grounded on the teacher's repeated `ThreadPool::new(n)` + mpsc-channel
//! shape (`scanners/arp_scanner.rs`'s `lookup_pool`), generalized from a
//! fixed DNS/vendor lookup into an arbitrary `(ctx, Inbound) -> Outbound`
//! function plus a pair of typed result/error output channels.

use log::warn;
use std::sync::mpsc::{Receiver, channel};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use crate::error::MasonError;

/// A counting semaphore bounding how many invocations of `f` may be in
/// flight at once.
struct Semaphore {
    available: Mutex<usize>,
    condvar: Condvar,
}

impl Semaphore {
    fn new(permits: usize) -> Self {
        Self {
            available: Mutex::new(permits),
            condvar: Condvar::new(),
        }
    }

    fn acquire(&self) {
        let mut available = self.available.lock().unwrap_or_else(|e| e.into_inner());
        while *available == 0 {
            available = self.condvar.wait(available).unwrap_or_else(|e| e.into_inner());
        }
        *available -= 1;
    }

    fn release(&self, permits: usize) {
        let mut available = self.available.lock().unwrap_or_else(|e| e.into_inner());
        *available += 1;
        debug_assert!(*available <= permits);
        self.condvar.notify_all();
    }

    /// Blocks until every permit has been returned, i.e. no invocation of
    /// `f` is still in flight.
    fn drain(&self, permits: usize) {
        let mut available = self.available.lock().unwrap_or_else(|e| e.into_inner());
        while *available < permits {
            available = self.condvar.wait(available).unwrap_or_else(|e| e.into_inner());
        }
    }
}

/// A generic bounded-concurrency worker pool: items arriving on an inbound
/// channel are each dispatched to a function `f`, with successes streamed
/// to a result channel and failures to a separate error channel.
pub struct WorkerPool {
    name: String,
    active: Arc<Mutex<usize>>,
}

impl WorkerPool {
    /// Builds a named, idle pool. `name` is used only for log messages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: Arc::new(Mutex::new(0)),
        }
    }

    /// Current number of in-flight invocations of `f`.
    pub fn active(&self) -> usize {
        *self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Consumes `inbound` on a background dispatch thread, invoking `f`
    /// with a clone of `ctx` and each inbound item, bounded to at most
    /// `max` concurrent invocations. `Ok` results are streamed on the
    /// returned result channel, `Err` results (paired with the input that
    /// produced them) on the returned error channel. A `max` of zero is
    /// promoted to one with a warning. Both output channels close once
    /// `inbound` closes and every in-flight invocation has completed.
    pub fn run<Ctx, In, Out, F>(
        &self,
        ctx: Ctx,
        max: usize,
        inbound: Receiver<In>,
        f: F,
    ) -> (Receiver<Out>, Receiver<(In, MasonError)>)
    where
        Ctx: Clone + Send + 'static,
        In: Send + 'static,
        Out: Send + 'static,
        F: Fn(&Ctx, &In) -> Result<Out, MasonError> + Send + Sync + 'static,
    {
        let max = if max == 0 {
            warn!(
                "worker pool '{}' configured with max=0, promoting to 1",
                self.name
            );
            1
        } else {
            max
        };

        let (result_tx, result_rx) = channel::<Out>();
        let (error_tx, error_rx) = channel::<(In, MasonError)>();
        let semaphore = Arc::new(Semaphore::new(max));
        let active = Arc::clone(&self.active);
        let f = Arc::new(f);

        thread::spawn(move || {
            for item in inbound.iter() {
                semaphore.acquire();
                *active.lock().unwrap_or_else(|e| e.into_inner()) += 1;

                let ctx = ctx.clone();
                let f = Arc::clone(&f);
                let result_tx = result_tx.clone();
                let error_tx = error_tx.clone();
                let semaphore = Arc::clone(&semaphore);
                let active = Arc::clone(&active);

                thread::spawn(move || {
                    match f(&ctx, &item) {
                        Ok(out) => {
                            let _ = result_tx.send(out);
                        }
                        Err(e) => {
                            let _ = error_tx.send((item, e));
                        }
                    }
                    *active.lock().unwrap_or_else(|e| e.into_inner()) -= 1;
                    semaphore.release(max);
                });
            }

            // inbound is closed; wait for every in-flight invocation to
            // finish before dropping the output senders.
            semaphore.drain(max);
        });

        (result_rx, error_rx)
    }
}

#[cfg(test)]
#[path = "./pool_tests.rs"]
mod tests;
