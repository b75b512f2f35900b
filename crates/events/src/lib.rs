//! `storefront-events`: in-process value distribution.
//!
//! Mechanics only; what is published (and what is durable) is decided by the
//! owner of the state.

pub mod bus;
pub mod replay_bus;

pub use bus::{CurrentValueBus, EventBus, Subscription};
pub use replay_bus::{ReplayBus, ReplayBusError};
