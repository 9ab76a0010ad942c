//! Fan-out of runtime events to the configured subscribers.
//!
//! One [`SubscriberSet`] owns, per subscriber, a bounded mpsc queue and a
//! worker task draining it. [`SubscriberSet::emit`] clones the event once
//! into an `Arc` and `try_send`s it to every queue, so emitting never waits
//! on a handler and one stuck subscriber cannot starve the others.
//!
//! Failure handling:
//! - a full or closed queue drops the event for that subscriber and publishes
//!   [`EventKind::SubscriberOverflow`](crate::EventKind::SubscriberOverflow);
//! - a panicking handler is caught per event and publishes
//!   [`EventKind::SubscriberPanicked`](crate::EventKind::SubscriberPanicked);
//! - neither diagnostic is ever emitted about a diagnostic event, keeping the
//!   reporting loop-free.
//!
//! Ordering holds per subscriber (its queue is FIFO); there is no ordering
//! across subscribers.

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event};

use super::Subscribe;

/// Send side of one subscriber's queue.
struct Queue {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Delivers events to every subscriber through per-subscriber queues.
pub struct SubscriberSet {
    queues: Vec<Queue>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Builds the set and spawns one worker task per subscriber.
    ///
    /// Must run inside a tokio runtime when `subs` is non-empty.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut queues = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, worker) = spawn_worker(sub, bus.clone());
            queues.push(Queue { name, tx });
            workers.push(worker);
        }

        Self {
            queues,
            workers,
            bus,
        }
    }

    /// Queues one event for every subscriber without waiting.
    pub fn emit(&self, event: &Event) {
        let shared = Arc::new(event.clone());
        for queue in &self.queues {
            let dropped = match queue.tx.try_send(Arc::clone(&shared)) {
                Ok(()) => None,
                Err(mpsc::error::TrySendError::Full(_)) => Some("full"),
                Err(mpsc::error::TrySendError::Closed(_)) => Some("closed"),
            };
            // Overflow reports about overflow events would feed back forever.
            if let Some(reason) = dropped {
                if !event.is_subscriber_overflow() {
                    self.bus
                        .publish(Event::subscriber_overflow(queue.name, reason));
                }
            }
        }
    }

    /// Closes every queue and waits for the workers to drain and finish.
    pub async fn shutdown(self) {
        drop(self.queues);
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// Whether the set was built without any subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// How many subscribers are attached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queues.len()
    }
}

/// Spawns the worker that feeds one subscriber from its queue.
fn spawn_worker(sub: Arc<dyn Subscribe>, bus: Bus) -> (mpsc::Sender<Arc<Event>>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
    let worker = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let handler = std::panic::AssertUnwindSafe(sub.on_event(event.as_ref()));
            if let Err(panic) = handler.catch_unwind().await {
                // A panic report about a panic report would feed back forever.
                if !event.is_subscriber_panic() {
                    bus.publish(Event::subscriber_panicked(sub.name(), panic_text(&*panic)));
                }
            }
        }
    });
    (tx, worker)
}

/// Recovers the message text from an unwind payload.
///
/// `panic!` with a literal carries `&'static str`, `panic!` with a format
/// string carries `String`; other payload types have no text to recover.
fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
