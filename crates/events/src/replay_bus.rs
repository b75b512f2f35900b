//! Current-value bus: a single-slot cell plus an observer list.

use std::sync::{Mutex, MutexGuard, PoisonError, mpsc};

use thiserror::Error;

use crate::bus::{CurrentValueBus, EventBus, Subscription};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayBusError {
    #[error("bus is closed")]
    Closed,
}

#[derive(Debug)]
struct ReplayState<M> {
    latest: M,
    subscribers: Vec<mpsc::Sender<M>>,
    closed: bool,
}

/// In-process bus that remembers the latest value.
///
/// - No IO / no async
/// - Swapping the latest value and fanning it out happen under one lock, so
///   every subscriber observes the same total order of values
/// - A new subscriber first receives the value current at subscribe time,
///   then every later publication
#[derive(Debug)]
pub struct ReplayBus<M> {
    state: Mutex<ReplayState<M>>,
}

impl<M> ReplayBus<M> {
    pub fn new(initial: M) -> Self {
        Self {
            state: Mutex::new(ReplayState {
                latest: initial,
                subscribers: Vec::new(),
                closed: false,
            }),
        }
    }

    // A panic while holding the lock cannot leave the slot half-written:
    // `latest` is assigned in a single move.
    fn state(&self) -> MutexGuard<'_, ReplayState<M>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of registered subscriptions (dropped ones are pruned on publish).
    pub fn subscriber_count(&self) -> usize {
        self.state().subscribers.len()
    }

    /// Disconnect every subscriber and refuse further publications.
    ///
    /// Values already delivered stay readable; afterwards `recv` fails.
    pub fn close(&self) {
        let mut state = self.state();
        state.closed = true;
        state.subscribers.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    /// Swap the current value without notifying anyone. Works on a closed
    /// bus; returns the previous value.
    pub fn replace(&self, value: M) -> M {
        std::mem::replace(&mut self.state().latest, value)
    }
}

impl<M> EventBus<M> for ReplayBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = ReplayBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut state = self.state();
        if state.closed {
            return Err(ReplayBusError::Closed);
        }

        state.latest = message.clone();

        // Drop any dead subscribers while publishing.
        state.subscribers.retain(|tx| tx.send(message.clone()).is_ok());

        tracing::trace!(subscribers = state.subscribers.len(), "replay bus published");
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        let mut state = self.state();
        // The receiver is alive here, so the replay cannot fail.
        let _ = tx.send(state.latest.clone());
        if !state.closed {
            state.subscribers.push(tx);
        }

        Subscription::new(rx)
    }
}

impl<M> CurrentValueBus<M> for ReplayBus<M>
where
    M: Clone + Send + 'static,
{
    fn latest(&self) -> M {
        self.state().latest.clone()
    }
}
