//! JWT claims and the role capability table

use serde::{Deserialize, Serialize};

use super::enums::Role;
use crate::error::AppError;

/// Actions gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create, update and delete catalog entries
    ManageCatalog,
    /// Create, update and deactivate member accounts
    ManageMembers,
    /// Issue and return loans
    Circulate,
    /// Mark fines paid or waived
    ManageFines,
    /// View dashboard statistics
    ViewReports,
    /// Manage librarian accounts
    ManageStaff,
}

impl Role {
    /// Capability table: members get nothing here and reach their own
    /// records through the self-or checks instead
    pub fn allows(&self, capability: Capability) -> bool {
        match self {
            Role::Admin => true,
            Role::Librarian => !matches!(capability, Capability::ManageStaff),
            Role::Member => false,
        }
    }
}

/// Claims carried in every access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Login identifier: email for members, username for staff
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Insufficient rights for this operation".to_string(),
            ))
        }
    }

    /// Pass when the caller is the member in question, or holds the
    /// capability. Lets members read their own loans and fines while staff
    /// can read anyone's.
    pub fn require_self_or(
        &self,
        member_id: i32,
        capability: Capability,
    ) -> Result<(), AppError> {
        if self.role == Role::Member && self.user_id == member_id {
            return Ok(());
        }
        self.require(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, user_id: i32) -> UserClaims {
        UserClaims {
            sub: "test".to_string(),
            user_id,
            role,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn admin_holds_every_capability() {
        for cap in [
            Capability::ManageCatalog,
            Capability::ManageMembers,
            Capability::Circulate,
            Capability::ManageFines,
            Capability::ViewReports,
            Capability::ManageStaff,
        ] {
            assert!(Role::Admin.allows(cap));
        }
    }

    #[test]
    fn librarian_cannot_manage_staff() {
        assert!(Role::Librarian.allows(Capability::Circulate));
        assert!(Role::Librarian.allows(Capability::ManageFines));
        assert!(!Role::Librarian.allows(Capability::ManageStaff));
    }

    #[test]
    fn member_reaches_only_own_records() {
        let member = claims(Role::Member, 7);
        assert!(member.require_self_or(7, Capability::Circulate).is_ok());
        assert!(member.require_self_or(8, Capability::Circulate).is_err());
        assert!(member.require(Capability::ManageCatalog).is_err());
    }

    #[test]
    fn tokens_round_trip() {
        let original = claims(Role::Librarian, 3);
        let token = original
            .create_token("secret")
            .expect("token should encode");
        let parsed = UserClaims::from_token(&token, "secret");
        // exp of 0 is in the past, so validation must reject it
        assert!(parsed.is_err());

        let valid = UserClaims {
            exp: chrono::Utc::now().timestamp() + 3600,
            ..claims(Role::Librarian, 3)
        };
        let token = valid.create_token("secret").expect("token should encode");
        let parsed = UserClaims::from_token(&token, "secret").expect("token should decode");
        assert_eq!(parsed.user_id, 3);
        assert_eq!(parsed.role, Role::Librarian);
    }
}
