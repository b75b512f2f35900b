//! `storefront-client`
//!
//! **Responsibility:** the I/O side of the admin console's authentication.
//!
//! This crate provides:
//! - The session store (durable token + current-value broadcast)
//! - Route guards with redirect-on-deny, and the console's route table
//! - The bearer-token request interceptor and an authenticated API client
//! - The auth gateway (login / register / logout)
//!
//! Token decoding and guard policies are pure and live in `storefront-auth`.

pub mod api;
pub mod config;
pub mod context;
pub mod gateway;
pub mod guards;
pub mod interceptor;
pub mod navigation;
pub mod router;
pub mod session_store;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, ConfigError};
pub use context::{AdminClient, InitError};
pub use gateway::{AuthError, AuthGateway, LoginOutcome, NewUser, RegisteredUser};
pub use guards::{ActivationGuard, AdminGuard, AuthGuard, CanActivate};
pub use interceptor::{BearerAuthenticator, RequestInterceptor};
pub use navigation::{HistoryNavigator, Navigator};
pub use router::{Activation, Router, View};
pub use session_store::SessionStore;
pub use storage::{FileTokenStorage, MemoryTokenStorage, StorageError, TokenStorage};
