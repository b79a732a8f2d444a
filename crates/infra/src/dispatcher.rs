//! Concurrent batch dispatch with per-request deadlines.
//!
//! A batch of beverage names is fanned out to a small pool of outlet threads.
//! Each request gets its own reply channel; the caller collects replies in
//! request order and waits at most `timeout` on each one. A reply that does
//! not arrive in time, or whose worker died, becomes a generic error outcome
//! so the batch always resolves.
//!
//! ```text
//! [tea, coffee, tea]
//!   ↓ queue (slot, name, reply)
//! outlet-0 outlet-1 outlet-2  → Preparer::prepare
//!   ↓ reply per slot
//! collect slot 0, 1, 2 with recv_timeout
//! ```
//!
//! A timed-out worker is not cancelled. If it finishes later its reply is
//! dropped; the inventory lock keeps its debit consistent either way.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use brewline_core::{DispenseError, Outcome};
use brewline_machine::Preparer;

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// How long to wait for each request's reply
    pub timeout: Duration,
    /// Maximum concurrent preparations (outlet count)
    pub max_concurrent: usize,
    /// Thread name prefix for logging
    pub name: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_concurrent: 1,
            name: "outlet".to_string(),
        }
    }
}

impl DispatcherConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }
}

struct Order {
    slot: usize,
    beverage: String,
    reply: SyncSender<Outcome>,
}

/// Runs batches of prepare requests concurrently.
#[derive(Debug)]
pub struct Dispatcher<P> {
    preparer: Arc<P>,
    config: DispatcherConfig,
}

impl<P: Preparer> Dispatcher<P> {
    pub fn new(preparer: Arc<P>, config: DispatcherConfig) -> Self {
        Self { preparer, config }
    }

    /// Prepare every beverage in `beverages`, returning one outcome per
    /// request in request order.
    ///
    /// Parallelism is `min(batch size, max_concurrent)`. A repeated name is
    /// two independent requests.
    pub fn dispatch<S: AsRef<str>>(&self, beverages: &[S]) -> Vec<Outcome> {
        if beverages.is_empty() {
            return Vec::new();
        }

        let batch = Uuid::now_v7();
        let span = info_span!("dispatch", %batch, size = beverages.len());
        let _enter = span.enter();

        let (order_tx, order_rx) = mpsc::channel::<Order>();
        let mut replies = Vec::with_capacity(beverages.len());
        for (slot, beverage) in beverages.iter().enumerate() {
            let (reply_tx, reply_rx) = mpsc::sync_channel(1);
            // The queue receiver is alive until workers are spawned below.
            let _ = order_tx.send(Order {
                slot,
                beverage: beverage.as_ref().to_string(),
                reply: reply_tx,
            });
            replies.push((beverage.as_ref(), reply_rx));
        }
        drop(order_tx);

        let width = self.config.max_concurrent.clamp(1, beverages.len());
        info!(width, "dispatching batch");
        self.spawn_outlets(width, order_rx);

        replies
            .into_iter()
            .enumerate()
            .map(|(slot, (beverage, rx))| self.collect(slot, beverage, &rx))
            .collect()
    }

    fn spawn_outlets(&self, width: usize, orders: Receiver<Order>) {
        let orders = Arc::new(Mutex::new(orders));
        for outlet in 0..width {
            let preparer = self.preparer.clone();
            let orders = orders.clone();
            let spawned = thread::Builder::new()
                .name(format!("{}-{outlet}", self.config.name))
                .spawn(move || outlet_loop(outlet, preparer, orders));
            // Orders left unserved drop their reply senders, which the
            // collector resolves as faults.
            if let Err(e) = spawned {
                error!(outlet, error = %e, "failed to spawn outlet thread");
            }
        }
    }

    fn collect(&self, slot: usize, beverage: &str, rx: &Receiver<Outcome>) -> Outcome {
        match rx.recv_timeout(self.config.timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                warn!(slot, beverage, timeout = ?self.config.timeout, "request timed out");
                DispenseError::Timeout.into()
            }
            Err(RecvTimeoutError::Disconnected) => {
                error!(slot, beverage, "outlet dropped request without replying");
                DispenseError::fault("reply channel disconnected").into()
            }
        }
    }
}

fn outlet_loop<P: Preparer>(outlet: usize, preparer: Arc<P>, orders: Arc<Mutex<Receiver<Order>>>) {
    loop {
        let order = {
            let Ok(queue) = orders.lock() else {
                return;
            };
            match queue.recv() {
                Ok(order) => order,
                Err(_) => return,
            }
        };

        let Order {
            slot,
            beverage,
            reply,
        } = order;
        debug!(outlet, slot, beverage = %beverage, "preparing");

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| preparer.prepare(&beverage))) {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(outlet, slot, beverage = %beverage, "preparation panicked");
                DispenseError::fault("preparation panicked").into()
            }
        };

        // The collector may already have given up on this slot.
        let _ = reply.send(outcome);
    }
}
