//! Authentication service: password hashing and token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{CreateMember, Librarian, Member, MemberStatus, Role, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate a member by email and return a JWT token
    pub async fn login_member(&self, email: &str, password: &str) -> AppResult<(String, Member)> {
        let member = self
            .repository
            .members
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !Self::verify_password(&member.password, password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }
        if member.status != MemberStatus::Active {
            return Err(AppError::Authentication(
                "Account is deactivated".to_string(),
            ));
        }

        let token = self.create_token(&member.email, member.id, Role::Member)?;
        Ok((token, member))
    }

    /// Authenticate a librarian by username and return a JWT token
    pub async fn login_staff(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<(String, Librarian)> {
        let librarian = self
            .repository
            .librarians
            .get_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        if !Self::verify_password(&librarian.password, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }
        if librarian.status != MemberStatus::Active {
            return Err(AppError::Authentication(
                "Account is deactivated".to_string(),
            ));
        }

        let token = self.create_token(&librarian.username, librarian.id, librarian.role)?;
        Ok((token, librarian))
    }

    /// Self-service member registration
    pub async fn register_member(&self, request: &CreateMember) -> AppResult<(String, Member)> {
        let hash = Self::hash_password(&request.password)?;
        let member = self.repository.members.create(request, &hash).await?;
        let token = self.create_token(&member.email, member.id, Role::Member)?;
        Ok((token, member))
    }

    fn create_token(&self, sub: &str, user_id: i32, role: Role) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: sub.to_string(),
            user_id,
            role,
            exp: now + self.config.jwt_expiration_hours as i64 * 3600,
            iat: now,
        };
        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Hash a password with argon2 and a fresh salt
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(stored_hash: &str, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_and_rejects() {
        let hash = AuthService::hash_password("hunter2").unwrap();
        assert!(AuthService::verify_password(&hash, "hunter2").unwrap());
        assert!(!AuthService::verify_password(&hash, "hunter3").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error_not_a_match() {
        assert!(AuthService::verify_password("not-a-hash", "hunter2").is_err());
    }
}
