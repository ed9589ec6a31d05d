//! Session context supplied by the identity provider.
//!
//! A `SessionContext` is handed to every collection manager at construction;
//! there is no process-wide "current user".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CollectionError;

/// Organization role of a user, team member, or invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub const ALL: &'static [Role] = &[Role::Admin, Role::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the signed-in user and the organization they act for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: String,
    pub role: Role,
    pub organization_id: String,
    pub organization_name: String,
}

impl SessionContext {
    pub fn new(
        user_id: impl Into<String>,
        role: Role,
        organization_id: impl Into<String>,
        organization_name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            organization_id: organization_id.into(),
            organization_name: organization_name.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Precondition for admin-only operations.
    pub fn require_admin(&self, operation: &str) -> Result<(), CollectionError> {
        if self.is_admin() {
            return Ok(());
        }
        tracing::debug!(
            user_id = %self.user_id,
            role = %self.role,
            operation,
            "rejected admin-only operation"
        );
        Err(CollectionError::Permission {
            operation: operation.to_string(),
            role: self.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_admin_rejects_regular_users() {
        let user = SessionContext::new("2", Role::User, "org-1", "Acme Inc");
        let err = user.require_admin("change team member role").unwrap_err();
        assert_eq!(
            err,
            CollectionError::Permission {
                operation: "change team member role".to_string(),
                role: Role::User,
            }
        );

        let admin = SessionContext::new("1", Role::Admin, "org-1", "Acme Inc");
        assert!(admin.require_admin("change team member role").is_ok());
    }

    #[test]
    fn role_round_trips_through_its_wire_value() {
        for role in Role::ALL {
            assert_eq!(Role::from_value(role.as_str()), Some(*role));
        }
        assert_eq!(Role::from_value("owner"), None);
    }
}
