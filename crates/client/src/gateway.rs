//! Login, registration and logout against the storefront backend.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use storefront_auth::{LOGIN_PATH, Role, Session, UserRole, decode};

use crate::api::{ApiClient, ApiError};
use crate::navigation::Navigator;
use crate::session_store::SessionStore;

pub const LOGIN_ENDPOINT: &str = "auth/login";
pub const REGISTER_ENDPOINT: &str = "auth/register";

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server error{}: {message}", status_suffix(.status))]
    Server { status: Option<u16>, message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// `{token, error}`; a non-empty `error` is a soft failure.
#[derive(Debug, Default, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Result of a successful login.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    /// Role read from the token, when the token decodes and carries one.
    pub role: Option<Role>,
}

impl core::fmt::Debug for LoginOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginOutcome")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Account to create through `auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub role: UserRole,
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish()
    }
}

/// The server's representation of a created account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUser {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

/// The only component that writes a freshly authenticated session.
#[derive(Clone)]
pub struct AuthGateway {
    api: ApiClient,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl AuthGateway {
    pub fn new(api: ApiClient, store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            store,
            navigator,
        }
    }

    /// Authenticate and, on success, make `{token, username}` the current session.
    ///
    /// The session is replaced (and broadcast) before this resolves. On any
    /// error the store is left untouched. Dropping the future before it
    /// resolves leaves the store untouched as well.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let request = LoginRequest { username, password };

        let response = match self.api.post_json::<_, LoginResponse>(LOGIN_ENDPOINT, &request).await {
            Ok(response) => response,
            Err(err) => {
                let err = login_error(err);
                tracing::info!(username, error = %err, "login failed");
                return Err(err);
            }
        };

        if let Some(message) = response.error.filter(|e| !e.trim().is_empty()) {
            tracing::info!(username, "login rejected");
            return Err(AuthError::InvalidCredentials(message));
        }

        let token = response.token.filter(|t| !t.is_empty()).ok_or_else(|| AuthError::Server {
            status: None,
            message: "login response carried no token".to_string(),
        })?;

        let role = match decode(&token) {
            Ok(claims) => claims.role,
            Err(err) => {
                tracing::debug!(error = %err, "login token does not decode; no role hint");
                None
            }
        };

        self.store.set(Session::authenticated(token.clone(), username));
        tracing::info!(username, role = role.as_ref().map(Role::as_str), "logged in");

        Ok(LoginOutcome { token, role })
    }

    /// Create an account. The current session is not changed.
    pub async fn register(&self, user: &NewUser) -> Result<RegisteredUser, AuthError> {
        match self.api.post_json::<_, RegisteredUser>(REGISTER_ENDPOINT, user).await {
            Ok(created) => {
                tracing::info!(username = %created.username, id = ?created.id, "user registered");
                Ok(created)
            }
            Err(err) => {
                let err = register_error(err);
                tracing::info!(username = %user.username, error = %err, "registration failed");
                Err(err)
            }
        }
    }

    /// Drop the session and go to the login view. Always succeeds.
    ///
    /// Emits "no session" and navigates once per call, even when already
    /// signed out.
    pub fn logout(&self) {
        self.store.clear();
        self.navigator.navigate(LOGIN_PATH);
        tracing::info!("logged out");
    }
}

impl core::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthGateway").field("api", &self.api).finish_non_exhaustive()
    }
}

fn login_error(err: ApiError) -> AuthError {
    match err {
        ApiError::Status { status: 400 | 401 | 403, body } => {
            let message = serde_json::from_str::<LoginResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "invalid username or password".to_string());
            AuthError::InvalidCredentials(message)
        }
        other => transport_error(other),
    }
}

fn register_error(err: ApiError) -> AuthError {
    match err {
        ApiError::Status { status: 400 | 409 | 422, body } => {
            let body = body.trim();
            AuthError::Validation(if body.is_empty() {
                "registration rejected".to_string()
            } else {
                body.to_string()
            })
        }
        other => transport_error(other),
    }
}

fn transport_error(err: ApiError) -> AuthError {
    match err {
        ApiError::Network(message) | ApiError::InvalidPath(message) => AuthError::Network(message),
        ApiError::Status { status, body } => AuthError::Server {
            status: Some(status),
            message: body,
        },
        ApiError::Parse(message) => AuthError::Server {
            status: None,
            message: format!("unreadable response: {message}"),
        },
    }
}
