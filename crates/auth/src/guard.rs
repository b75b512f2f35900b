//! Route-activation policies.
//!
//! - No IO
//! - No panics
//! - No caching: every evaluation reads the session it is given
//!
//! The redirect side effect lives with the caller (see the client crate);
//! a policy only says where a denied navigation should go.

use serde::Serialize;

use crate::Session;

/// Where every denied navigation is sent.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// No token in the session.
    Unauthenticated,
    /// A token is present but its claims do not decode.
    UndecodableToken,
    /// The claims decode but the role is not `ADMIN`.
    NotAdmin,
}

/// Why a policy refused activation, and where to go instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub guard: &'static str,
    pub kind: DenialKind,
    pub redirect_to: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// A predicate gating route activation.
pub trait RouteGuard: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, session: &Session) -> Decision;
}

/// Allows any session holding a token, whether or not it decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireAuthenticated;

impl RouteGuard for RequireAuthenticated {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn evaluate(&self, session: &Session) -> Decision {
        if session.is_authenticated() {
            Decision::Allow
        } else {
            deny(self.name(), DenialKind::Unauthenticated)
        }
    }
}

/// Allows only sessions whose token decodes to `role == "ADMIN"`.
///
/// Performs no separate authentication check: an absent token simply fails
/// to decode. Declare it after [`RequireAuthenticated`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireAdmin;

impl RouteGuard for RequireAdmin {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn evaluate(&self, session: &Session) -> Decision {
        match session.claims() {
            None => deny(self.name(), DenialKind::Unauthenticated),
            Some(Err(_)) => deny(self.name(), DenialKind::UndecodableToken),
            Some(Ok(claims)) if claims.is_admin() => Decision::Allow,
            Some(Ok(_)) => deny(self.name(), DenialKind::NotAdmin),
        }
    }
}

fn deny(guard: &'static str, kind: DenialKind) -> Decision {
    Decision::Deny(Denial {
        guard,
        kind,
        redirect_to: LOGIN_PATH,
    })
}

/// Evaluate `guards` in declared order, stopping at the first denial.
pub fn evaluate_in_order<'a, I>(guards: I, session: &Session) -> Decision
where
    I: IntoIterator<Item = &'a dyn RouteGuard>,
{
    for guard in guards {
        let decision = guard.evaluate(session);
        if !decision.is_allow() {
            return decision;
        }
    }
    Decision::Allow
}
