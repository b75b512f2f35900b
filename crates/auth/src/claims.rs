use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::Role;

/// Claims carried in the payload segment of a bearer token.
///
/// Every field is optional: the client only ever *reads* claims and must
/// tolerate whatever the backend chooses to put in the token. A known field
/// holding a value of the wrong type reads as absent; it never fails the
/// whole payload. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the backend sets this to the username).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Issued-at, seconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiry, seconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Read an optional field, mapping a mistyped value to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_admin)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Inspect the `iat`/`exp` window against `now`.
    ///
    /// Informational only. The signature is never verified client-side, so
    /// nothing here is a security decision; guards and the request
    /// authenticator do not consult it. Missing timestamps are not errors.
    pub fn time_window(&self, now: DateTime<Utc>) -> Result<(), ClaimsWindowError> {
        let issued_at = self.issued_at();
        let expires_at = self.expires_at();

        if let (Some(iat), Some(exp)) = (issued_at, expires_at) {
            if exp <= iat {
                return Err(ClaimsWindowError::InvalidTimeWindow);
            }
        }
        if let Some(iat) = issued_at {
            if now < iat {
                return Err(ClaimsWindowError::NotYetValid);
            }
        }
        if let Some(exp) = expires_at {
            if now >= exp {
                return Err(ClaimsWindowError::Expired);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimsWindowError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}
