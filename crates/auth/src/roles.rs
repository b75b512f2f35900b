use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier carried in the token's `role` claim.
///
/// Roles are opaque strings at this layer. Comparison is exact and
/// case-sensitive: `"admin"` is not [`Role::ADMIN`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// The only role that unlocks admin-guarded views.
    pub const ADMIN: Role = Role(Cow::Borrowed("ADMIN"));

    pub const USER: Role = Role(Cow::Borrowed("USER"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.as_str() == Self::ADMIN.as_str()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role requested when registering a new account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_role(&self) -> Role {
        match self {
            UserRole::User => Role::USER,
            UserRole::Admin => Role::ADMIN,
        }
    }
}

impl core::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(UserRole::User),
            "ADMIN" => Ok(UserRole::Admin),
            other => Err(format!("unknown role '{other}' (expected USER or ADMIN)")),
        }
    }
}
