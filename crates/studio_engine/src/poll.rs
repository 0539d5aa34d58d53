//! Fixed-interval polling with a cancellation gate.
//!
//! Every tick spawns its probe as a separate task and numbers it. Results are
//! handed to a delivery callback one at a time; once [`PollHandle::cancel`]
//! returns, no further delivery runs, even for probes already in flight.
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollControl {
    Continue,
    Stop,
}

#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    sequence: Arc<AtomicU64>,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Continues tick numbering from a counter that outlives this poller.
    pub fn with_sequence(mut self, sequence: Arc<AtomicU64>) -> Self {
        self.sequence = sequence;
        self
    }

    /// Starts ticking on the current tokio runtime. The first tick fires
    /// immediately.
    ///
    /// `deliver` runs under the cancellation gate and must not cancel its own
    /// poller; it returns [`PollControl::Stop`] instead.
    pub fn spawn<P, Fut, T, D>(self, probe: P, deliver: D) -> PollHandle
    where
        P: Fn(u64) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        D: FnMut(u64, T) -> PollControl + Send + 'static,
    {
        let shared = Arc::new(PollShared {
            token: CancellationToken::new(),
            cancelled: Mutex::new(false),
            sequence: self.sequence,
        });
        let handle = PollHandle {
            shared: shared.clone(),
        };
        let deliver = Arc::new(Mutex::new(deliver));
        let interval = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = shared.token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let seq = shared.sequence.fetch_add(1, Ordering::SeqCst) + 1;
                let response = probe(seq);
                let tick_shared = shared.clone();
                let deliver = deliver.clone();
                tokio::spawn(async move {
                    let value = tokio::select! {
                        biased;
                        _ = tick_shared.token.cancelled() => return,
                        value = response => value,
                    };
                    tick_shared.deliver(seq, value, &deliver);
                });
            }
        });

        handle
    }
}

#[derive(Debug)]
struct PollShared {
    token: CancellationToken,
    cancelled: Mutex<bool>,
    sequence: Arc<AtomicU64>,
}

impl PollShared {
    fn gate(&self) -> MutexGuard<'_, bool> {
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver<T, D>(&self, seq: u64, value: T, deliver: &Mutex<D>)
    where
        D: FnMut(u64, T) -> PollControl,
    {
        let mut cancelled = self.gate();
        if *cancelled {
            return;
        }
        let mut guard = deliver.lock().unwrap_or_else(PoisonError::into_inner);
        let deliver = &mut *guard;
        if deliver(seq, value) == PollControl::Stop {
            *cancelled = true;
            self.token.cancel();
        }
    }
}

/// Shared handle to a running poller. Dropping it does not stop the poller.
#[derive(Debug, Clone)]
pub struct PollHandle {
    shared: Arc<PollShared>,
}

impl PollHandle {
    /// Idempotent. Blocks while a delivery is running.
    pub fn cancel(&self) {
        let mut cancelled = self.shared.gate();
        *cancelled = true;
        self.shared.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.shared.gate()
    }

    /// Sequence number of the newest tick issued, 0 before the first.
    pub fn issued(&self) -> u64 {
        self.shared.sequence.load(Ordering::SeqCst)
    }
}
