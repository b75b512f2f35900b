//! Publish/subscribe contract (mechanics only).
//!
//! A bus distributes values to every live subscriber. The contract here is
//! stricter than a fire-and-forget event bus:
//!
//! - **Ordered**: each subscriber sees values in publication order
//! - **Synchronous hand-off**: when `publish` returns, the value is already
//!   queued on every live subscription
//! - **No persistence**: the bus only distributes; the owner of the state
//!   decides what is durable

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// A subscription to a bus.
///
/// Each subscription receives its own copy of every value published after it
/// was created (and, for current-value buses, the value current at subscribe
/// time). Dropping the subscription unsubscribes; the bus prunes it on the
/// next publish.
///
/// ```ignore
/// let subscription = bus.subscribe();
/// let current = subscription.recv()?;   // replayed latest value
/// for update in subscription.drain() { /* ... */ }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next value is available.
    ///
    /// Fails once the bus has been closed and every queued value consumed.
    pub fn recv(&self) -> Result<M, RecvError> {
        self.receiver.recv()
    }

    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Take every value already delivered, in order, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Domain-agnostic pub/sub abstraction.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

/// A bus that always holds a current value and replays it to new subscribers.
pub trait CurrentValueBus<M>: EventBus<M> {
    /// The most recently published value (or the initial one).
    fn latest(&self) -> M;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}

impl<M, B> CurrentValueBus<M> for Arc<B>
where
    B: CurrentValueBus<M> + ?Sized,
{
    fn latest(&self) -> M {
        (**self).latest()
    }
}
