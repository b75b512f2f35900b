use serde::{Deserialize, Serialize};

use crate::{Claims, DecodeError, Role, decode};

/// The client's view of its own authentication state.
///
/// A `Session` is an immutable value: it is replaced wholesale, never edited.
/// Claims are derived on demand from the token and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    token: Option<String>,
    username: Option<String>,
}

impl Session {
    /// The "no session" value.
    pub fn none() -> Self {
        Self::default()
    }

    /// A session recovered from durable storage: the username is not persisted.
    ///
    /// An empty token is the same as no token.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: non_empty(token.into()),
            username: None,
        }
    }

    /// A session established by a fresh login.
    pub fn authenticated(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: non_empty(token.into()),
            username: Some(username.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Token presence only. A corrupt or expired token still counts.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn claims(&self) -> Option<Result<Claims, DecodeError>> {
        self.token().map(decode)
    }

    /// The token's role, if it decodes and carries one.
    pub fn role(&self) -> Option<Role> {
        match self.claims()? {
            Ok(claims) => claims.role,
            Err(err) => {
                tracing::debug!(error = %err, "session token does not decode; no role");
                None
            }
        }
    }

    /// Fail-closed: any decode failure or missing token is "not admin".
    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(|role| role.is_admin())
    }
}

fn non_empty(token: String) -> Option<String> {
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn token_with_role(role: &str) -> String {
        let payload = base64::engine::general_purpose::STANDARD
            .encode(serde_json::json!({ "role": role }).to_string());
        format!("header.{payload}.sig")
    }

    #[test]
    fn no_session_is_neither_authenticated_nor_admin() {
        let session = Session::none();
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
        assert!(session.claims().is_none());
    }

    #[test]
    fn admin_token_is_admin() {
        let session = Session::from_token(token_with_role("ADMIN"));
        assert!(session.is_authenticated());
        assert!(session.is_admin());
        assert_eq!(session.username(), None);
    }

    #[test]
    fn user_token_is_not_admin() {
        let session = Session::authenticated(token_with_role("USER"), "bob");
        assert!(session.is_authenticated());
        assert!(!session.is_admin());
        assert_eq!(session.role(), Some(Role::USER));
        assert_eq!(session.username(), Some("bob"));
    }

    #[test]
    fn garbage_token_is_authenticated_but_not_admin() {
        let session = Session::from_token("garbage");
        assert!(session.is_authenticated());
        assert!(!session.is_admin());
        assert!(matches!(session.claims(), Some(Err(_))));
    }

    #[test]
    fn empty_token_is_not_authenticated() {
        let session = Session::from_token("");
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(session, Session::none());
    }

    #[test]
    fn admin_despite_an_unreadable_expiry() {
        let payload = base64::engine::general_purpose::STANDARD
            .encode(r#"{"role":"ADMIN","exp":"never"}"#);
        let session = Session::from_token(format!("header.{payload}.sig"));
        assert!(session.is_admin());
        assert!(matches!(session.claims(), Some(Ok(claims)) if claims.exp.is_none()));
    }
}
