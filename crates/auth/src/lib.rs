//! `storefront-auth`: pure session and authorization model for the admin client.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod guard;
pub mod roles;
pub mod session;
pub mod token;

pub use claims::{Claims, ClaimsWindowError};
pub use guard::{
    Decision, Denial, DenialKind, LOGIN_PATH, RequireAdmin, RequireAuthenticated, RouteGuard,
    evaluate_in_order,
};
pub use roles::{Role, UserRole};
pub use session::Session;
pub use token::{DecodeError, decode};
