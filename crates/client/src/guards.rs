//! Route guards as the router sees them: `can_activate() -> bool`.
//!
//! A guard evaluates its policy against the session current *at call time*
//! and, on denial, issues the redirect itself before returning `false`. The
//! router does nothing beyond blocking activation.

use std::sync::Arc;

use storefront_auth::{Decision, RequireAdmin, RequireAuthenticated, RouteGuard};

use crate::navigation::Navigator;
use crate::session_store::SessionStore;

pub trait CanActivate: Send + Sync {
    /// The side-effect-free policy behind this guard.
    fn policy(&self) -> &dyn RouteGuard;

    fn can_activate(&self) -> bool;
}

/// A [`RouteGuard`] policy bound to the session store and the navigator.
pub struct ActivationGuard<G> {
    policy: G,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
}

pub type AuthGuard = ActivationGuard<RequireAuthenticated>;
pub type AdminGuard = ActivationGuard<RequireAdmin>;

impl<G: RouteGuard> ActivationGuard<G> {
    pub fn new(policy: G, store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            policy,
            store,
            navigator,
        }
    }
}

impl AuthGuard {
    pub fn authenticated(store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self::new(RequireAuthenticated, store, navigator)
    }
}

impl AdminGuard {
    pub fn admin(store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self::new(RequireAdmin, store, navigator)
    }
}

impl<G: RouteGuard> CanActivate for ActivationGuard<G> {
    fn policy(&self) -> &dyn RouteGuard {
        &self.policy
    }

    fn can_activate(&self) -> bool {
        match self.policy.evaluate(&self.store.get()) {
            Decision::Allow => {
                tracing::debug!(guard = self.policy.name(), "activation allowed");
                true
            }
            Decision::Deny(denial) => {
                tracing::debug!(
                    guard = denial.guard,
                    kind = ?denial.kind,
                    redirect_to = denial.redirect_to,
                    "activation denied"
                );
                self.navigator.navigate(denial.redirect_to);
                false
            }
        }
    }
}
