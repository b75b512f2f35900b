//! The single authoritative holder of the current session.

use std::sync::{Arc, Mutex, PoisonError};

use storefront_auth::Session;
use storefront_events::{CurrentValueBus, EventBus, ReplayBus, Subscription};

use crate::storage::TokenStorage;

/// Handle to the process-wide session state.
///
/// Cloning the handle shares the same state. The current [`Session`] lives in
/// a [`ReplayBus`] slot, so reading it never waits on I/O and every
/// replacement is a whole-value swap that subscribers observe in order.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    storage: Arc<dyn TokenStorage>,
    bus: ReplayBus<Session>,
    // Serializes persist + publish so storage and broadcast order agree.
    writer: Mutex<()>,
}

impl SessionStore {
    /// Seed the session from durable storage: `{token}` only, the username is
    /// never persisted.
    pub fn init(storage: Arc<dyn TokenStorage>) -> Self {
        let initial = match storage.load() {
            Ok(Some(token)) => Session::from_token(token),
            Ok(None) => Session::none(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read stored session token; starting signed out");
                Session::none()
            }
        };

        tracing::info!(
            authenticated = initial.is_authenticated(),
            "session store initialized"
        );

        Self {
            inner: Arc::new(Inner {
                storage,
                bus: ReplayBus::new(initial),
                writer: Mutex::new(()),
            }),
        }
    }

    pub fn get(&self) -> Session {
        self.inner.bus.latest()
    }

    /// Token presence only (fail-open).
    pub fn is_authenticated(&self) -> bool {
        self.get().is_authenticated()
    }

    /// Token decodes and claims `role == "ADMIN"` (fail-closed).
    pub fn is_admin(&self) -> bool {
        self.get().is_admin()
    }

    /// Replace the current session.
    ///
    /// Persists the token (or removes it when absent), then swaps and
    /// broadcasts. When this returns, every live subscriber has the new value
    /// queued. A storage failure is logged and does not block the in-memory
    /// update. After [`SessionStore::dispose`] the session is still persisted
    /// and swapped, but nothing is broadcast.
    pub fn set(&self, session: Session) {
        let _writer = self.inner.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let persisted = match session.token() {
            Some(token) => self.inner.storage.store(token),
            None => self.inner.storage.remove(),
        };
        if let Err(err) = persisted {
            tracing::warn!(error = %err, "failed to persist session token; in-memory session still updated");
        }

        let authenticated = session.is_authenticated();
        if self.inner.bus.is_closed() {
            self.inner.bus.replace(session);
            tracing::debug!(authenticated, "session replaced after dispose; not broadcast");
            return;
        }
        if let Err(err) = self.inner.bus.publish(session) {
            tracing::warn!(error = %err, "session broadcast rejected");
            return;
        }

        tracing::debug!(authenticated, "session replaced");
    }

    pub fn clear(&self) {
        self.set(Session::none());
    }

    /// Observe the session: the current value first, then every replacement.
    pub fn subscribe(&self) -> Subscription<Session> {
        self.inner.bus.subscribe()
    }

    /// Disconnect all subscribers and stop broadcasting.
    ///
    /// The session stays readable through [`SessionStore::get`], and `set` /
    /// `clear` keep updating it and durable storage.
    pub fn dispose(&self) {
        let _writer = self.inner.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.inner.bus.close();
        tracing::debug!("session store disposed");
    }
}
