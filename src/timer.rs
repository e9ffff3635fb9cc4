//! Live elapsed-time value for one displayed session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

use crate::clock::SharedClock;
use crate::domain::Timestamp;
use crate::timing::{duration_seconds, format_duration_hms};

pub const TICK: Duration = Duration::from_secs(1);

/// Elapsed seconds of a session, recomputed every [`TICK`] while it runs.
///
/// The value is computed once on creation. A running timer owns a background
/// task that is aborted on [`LiveTimer::freeze`] or when the timer is dropped.
/// While running, published values never decrease.
pub struct LiveTimer {
    started_at: Timestamp,
    stopped_at: Option<Timestamp>,
    clock: SharedClock,
    sender: Arc<watch::Sender<i64>>,
    receiver: watch::Receiver<i64>,
    task: Option<JoinHandle<()>>,
}

impl LiveTimer {
    /// Must be called inside a tokio runtime when `stopped_at` is `None`.
    pub fn start(started_at: Timestamp, stopped_at: Option<Timestamp>, clock: SharedClock) -> Self {
        let initial = duration_seconds(started_at, stopped_at, clock.now_millis());
        let (sender, receiver) = watch::channel(initial);
        let sender = Arc::new(sender);

        let task = if stopped_at.is_none() {
            Some(tokio::spawn(tick(started_at, clock.clone(), sender.clone())))
        } else {
            None
        };

        Self {
            started_at,
            stopped_at,
            clock,
            sender,
            receiver,
            task,
        }
    }

    /// Stops rescheduling and pins the value to the static duration.
    pub fn freeze(&mut self, stopped_at: Timestamp) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.stopped_at = Some(stopped_at);
        let frozen = duration_seconds(self.started_at, Some(stopped_at), self.clock.now_millis());
        self.sender.send_replace(frozen);
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn seconds(&self) -> i64 {
        *self.receiver.borrow()
    }

    pub fn formatted(&self) -> String {
        format_duration_hms(self.seconds())
    }

    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.receiver.clone()
    }
}

impl Drop for LiveTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn tick(started_at: Timestamp, clock: SharedClock, sender: Arc<watch::Sender<i64>>) {
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let computed = duration_seconds(started_at, None, clock.now_millis());
        let previous = *sender.borrow();
        let next = computed.max(previous);
        trace!(started_at, elapsed = next, "Timer tick");
        sender.send_replace(next);
    }
}
